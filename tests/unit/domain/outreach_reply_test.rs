// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use outreachrs::domain::services::outreach_generator::parse_outreach_reply;

    #[test]
    fn test_typical_model_reply() {
        let reply = "Subject: Loved your sourdough guide\n\nHi Crumb & Co team,\n\n\
                     I came across your website while researching Bristol bakeries.\n\n\
                     Best regards,\nSam from Acme";

        let email = parse_outreach_reply(reply).unwrap();

        assert_eq!(email.subject, "Loved your sourdough guide");
        assert!(email.body.starts_with("Hi Crumb & Co team,"));
        assert!(email.body.ends_with("Sam from Acme"));
        assert!(!email.body.contains("Subject:"));
    }

    #[test]
    fn test_markdown_heading_subject() {
        let email = parse_outreach_reply("## Subject: Partnership idea\n\nHello!").unwrap();
        assert_eq!(email.subject, "Partnership idea");
        assert_eq!(email.body, "Hello!");
    }
}
