/// Extracts the registrable domain from a hostname
///
/// The registrable domain is the last two dot-separated labels of the host
/// (`example.com` in `blog.example.com`). Hosts with two or fewer labels are
/// returned unchanged, so `localhost` and `example.com` map to themselves
/// and the extraction never indexes out of bounds.
///
/// # Examples
///
/// ```
/// use skimmer::url::registrable_domain;
///
/// assert_eq!(registrable_domain("blog.example.com"), "example.com");
/// assert_eq!(registrable_domain("example.com"), "example.com");
/// assert_eq!(registrable_domain("localhost"), "localhost");
/// ```
pub fn registrable_domain(host: &str) -> &str {
    let dots: Vec<usize> = host.match_indices('.').map(|(i, _)| i).collect();
    if dots.len() <= 1 {
        host
    } else {
        &host[dots[dots.len() - 2] + 1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_reduces_to_registrable() {
        assert_eq!(registrable_domain("blog.example.com"), "example.com");
    }

    #[test]
    fn test_nested_subdomain() {
        assert_eq!(registrable_domain("api.v2.example.com"), "example.com");
    }

    #[test]
    fn test_two_labels_unchanged() {
        assert_eq!(registrable_domain("example.com"), "example.com");
    }

    #[test]
    fn test_single_label_unchanged() {
        assert_eq!(registrable_domain("localhost"), "localhost");
    }

    #[test]
    fn test_empty_host() {
        assert_eq!(registrable_domain(""), "");
    }

    #[test]
    fn test_ip_like_host() {
        // Dotted hosts are treated purely as labels; no public-suffix logic.
        assert_eq!(registrable_domain("127.0.0.1"), "0.1");
    }
}
