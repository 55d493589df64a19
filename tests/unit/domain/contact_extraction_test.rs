// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use outreachrs::domain::models::contact_profile::SocialPlatform;
    use outreachrs::domain::services::contact_extractor::ContactExtractor;
    use url::Url;

    const BAKERY: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Welcome | Crumb &amp; Co Bakery - Artisan Bread in Bristol</title>
  <meta property="og:site_name" content="Crumb &amp; Co">
  <script>var tracking = "noreply@sentry.io"; var id = 1234567890123;</script>
  <style>.phone::after { content: "0800 000 0000"; }</style>
</head>
<body>
  <header>
    <nav>
      <a href="/">Home</a>
      <a href="/menu">Menu</a>
      <a href="/contact-us">Contact us</a>
    </nav>
  </header>
  <main>
    <p>Fresh sourdough every morning since 2009-04-01.</p>
    <p>Orders: orders [at] crumbandco [dot] co [dot] uk or ORDERS@CrumbAndCo.co.uk</p>
    <p>Shop: +44 117 496 0123 &middot; Wholesale: (0117) 496-0456</p>
    <img src="/images/logo@2x.png" alt="logo">
  </main>
  <footer>
    <address>12 Baker Street, Bristol, BS1 4AB</address>
    <a href="https://www.facebook.com/crumbandco">Facebook</a>
    <a href="https://www.facebook.com/sharer/sharer.php?u=https://crumbandco.co.uk">Share</a>
    <a href="https://instagram.com/crumb.and.co/">Instagram</a>
    <a href="https://twitter.com/intent/tweet?text=bread">Tweet this</a>
    <a href="https://x.com/crumbandco">X</a>
    <a href="https://www.youtube.com/@crumbandco">YouTube</a>
    <a href="tel:+441174960123">Call</a>
  </footer>
</body>
</html>"#;

    fn site() -> Url {
        Url::parse("https://www.crumbandco.co.uk/").unwrap()
    }

    #[test]
    fn test_realistic_page_profile() {
        let profile = ContactExtractor::extract(BAKERY, &site());

        assert_eq!(profile.business_name.as_deref(), Some("Crumb & Co"));
        assert_eq!(profile.emails, vec!["orders@crumbandco.co.uk"]);
        assert!(profile.emails.iter().all(|e| !e.contains("sentry")));
        assert!(profile.emails.iter().all(|e| !e.ends_with(".png")));

        assert_eq!(profile.phones.len(), 2, "{:?}", profile.phones);
        assert!(profile.phones[0].starts_with("+44 117 496 0123"));
        assert!(profile.phones.iter().all(|p| !p.contains("0800")));

        assert_eq!(
            profile.social_links.get(&SocialPlatform::Facebook).map(String::as_str),
            Some("https://www.facebook.com/crumbandco")
        );
        assert!(profile.social_links.contains_key(&SocialPlatform::Instagram));
        assert_eq!(
            profile.social_links.get(&SocialPlatform::Twitter).map(String::as_str),
            Some("https://x.com/crumbandco")
        );
        assert!(profile.social_links.contains_key(&SocialPlatform::Youtube));
        assert!(!profile.social_links.contains_key(&SocialPlatform::Linkedin));

        assert_eq!(
            profile.address.as_deref(),
            Some("12 Baker Street, Bristol, BS1 4AB")
        );
        assert_eq!(
            profile.contact_page.as_deref(),
            Some("https://www.crumbandco.co.uk/contact-us")
        );
        assert!(profile.page_excerpt.contains("Fresh sourdough"));
        assert!(!profile.page_excerpt.contains("tracking"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let a = ContactExtractor::extract(BAKERY, &site());
        let b = ContactExtractor::extract(BAKERY, &site());
        assert_eq!(a, b);
    }
}
