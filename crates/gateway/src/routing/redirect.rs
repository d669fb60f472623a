//! Canonical-host redirect
//!
//! Decides whether the current host should be permanently redirected to the
//! canonical domain: the bound site's main domain, or the globally configured
//! domain when no site is bound. The destination preserves scheme, base
//! path, path and query verbatim; only the host is substituted.

use sitegate_shared::Site;

use crate::config::Config;

/// Compute the redirect target host for this request, if any.
///
/// With a bound site, its `redirect_to_main_domain` flag and `main_domain`
/// decide. Without one, the global settings apply, but never to
/// administrative traffic.
pub fn compute_redirect(
    current_host: &str,
    site: Option<&Site>,
    config: &Config,
    is_admin: bool,
) -> Option<String> {
    match site {
        Some(site) => {
            if site.redirect_to_main_domain && site.main_domain != current_host {
                Some(site.main_domain.clone())
            } else {
                None
            }
        }
        None => {
            let domain = config.main_domain.as_deref()?;
            if config.redirect_to_main_domain && !is_admin && domain != current_host {
                Some(domain.to_string())
            } else {
                None
            }
        }
    }
}

/// Destination URL: `scheme://targetHost basePath path[?query]`.
///
/// `raw_path` and `query` come straight from the request URI and are not
/// re-encoded.
pub fn build_redirect_url(
    scheme: &str,
    target_host: &str,
    base_path: &str,
    raw_path: &str,
    query: Option<&str>,
) -> String {
    let qs = match query {
        Some(q) => format!("?{q}"),
        None => String::new(),
    };
    format!("{scheme}://{target_host}{base_path}{raw_path}{qs}")
}

/// Whether `field` occurs in a form-urlencoded payload (query string or
/// request body). Presence-only: any value, including the empty string,
/// counts.
pub fn form_has_field(encoded: &[u8], field: &str) -> bool {
    url::form_urlencoded::parse(encoded).any(|(key, _)| key == field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DISABLE_HOST_REDIRECT_FIELD;
    use sitegate_shared::SiteId;

    fn shop_site(redirect: bool) -> Site {
        Site {
            id: SiteId::new(),
            domains: vec!["shop.example.com".to_string(), "example.com".to_string()],
            root_path: "/sites/shop".to_string(),
            main_domain: "shop.example.com".to_string(),
            redirect_to_main_domain: redirect,
        }
    }

    fn global_config(redirect: bool, domain: Option<&str>) -> Config {
        Config {
            redirect_to_main_domain: redirect,
            main_domain: domain.map(|d| d.to_string()),
            ..Config::for_tests()
        }
    }

    #[test]
    fn test_site_redirects_off_canonical_host() {
        let site = shop_site(true);
        let config = global_config(false, None);

        let target = compute_redirect("example.com", Some(&site), &config, false);
        assert_eq!(target.as_deref(), Some("shop.example.com"));
    }

    #[test]
    fn test_site_on_canonical_host_does_not_redirect() {
        let site = shop_site(true);
        let config = global_config(false, None);

        assert!(compute_redirect("shop.example.com", Some(&site), &config, false).is_none());
    }

    #[test]
    fn test_site_without_flag_does_not_redirect() {
        let site = shop_site(false);
        let config = global_config(true, Some("canonical.example.com"));

        // The bound site's flag wins; global settings do not apply
        assert!(compute_redirect("example.com", Some(&site), &config, false).is_none());
    }

    #[test]
    fn test_global_redirect_without_site() {
        let config = global_config(true, Some("canonical.example.com"));

        let target = compute_redirect("other.example.com", None, &config, false);
        assert_eq!(target.as_deref(), Some("canonical.example.com"));

        assert!(compute_redirect("canonical.example.com", None, &config, false).is_none());
    }

    #[test]
    fn test_global_redirect_skips_admin_traffic() {
        let config = global_config(true, Some("canonical.example.com"));

        assert!(compute_redirect("other.example.com", None, &config, true).is_none());
    }

    #[test]
    fn test_global_redirect_requires_domain() {
        let config = global_config(true, None);

        assert!(compute_redirect("other.example.com", None, &config, false).is_none());
    }

    #[test]
    fn test_build_redirect_url_preserves_path_and_query() {
        let url = build_redirect_url(
            "https",
            "shop.example.com",
            "",
            "/a/b",
            Some("x=1&y=2"),
        );
        assert_eq!(url, "https://shop.example.com/a/b?x=1&y=2");

        let url = build_redirect_url("http", "shop.example.com", "/cms", "/a%20b", None);
        assert_eq!(url, "http://shop.example.com/cms/a%20b");
    }

    #[test]
    fn test_form_has_field_is_presence_only() {
        let f = DISABLE_HOST_REDIRECT_FIELD;
        assert!(form_has_field(b"disable_host_redirect=1", f));
        assert!(form_has_field(b"disable_host_redirect=", f));
        assert!(form_has_field(b"disable_host_redirect", f));
        assert!(form_has_field(b"a=b&disable_host_redirect=false", f));
        assert!(!form_has_field(b"a=b&c=d", f));
        assert!(!form_has_field(b"", f));
    }
}
