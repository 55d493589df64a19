pub mod contact_extraction_test;
pub mod outreach_reply_test;
