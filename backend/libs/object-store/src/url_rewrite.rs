//! Dual-endpoint URL rewriting: presigned URLs are signed against the
//! internal endpoint but handed to clients who can only reach the public one.

use url::Url;

/// Rewrites `presigned`'s scheme+host+port to `public_endpoint`'s, preserving
/// path and query (where the SigV4 signature lives). If either URL fails to
/// parse, or the origins already match, the input is returned unchanged.
pub fn rewrite_to_public_endpoint(presigned: &str, public_endpoint: Option<&str>) -> String {
    let Some(public_endpoint) = public_endpoint else {
        return presigned.to_string();
    };

    let (Ok(mut presigned_url), Ok(public_url)) = (Url::parse(presigned), Url::parse(public_endpoint)) else {
        return presigned.to_string();
    };

    if presigned_url.scheme() == public_url.scheme()
        && presigned_url.host_str() == public_url.host_str()
        && presigned_url.port() == public_url.port()
    {
        return presigned.to_string();
    }

    if presigned_url.set_scheme(public_url.scheme()).is_err() {
        return presigned.to_string();
    }
    if presigned_url
        .set_host(public_url.host_str())
        .is_err()
    {
        return presigned.to_string();
    }
    if presigned_url.set_port(public_url.port()).is_err() {
        return presigned.to_string();
    }

    presigned_url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_host_and_scheme() {
        let presigned = "http://minio-internal:9000/bucket/key?X-Amz-Signature=abc";
        let rewritten = rewrite_to_public_endpoint(presigned, Some("https://cdn.example.com"));
        assert!(rewritten.starts_with("https://cdn.example.com"));
        assert!(rewritten.contains("X-Amz-Signature=abc"));
    }

    #[test]
    fn no_public_endpoint_returns_unchanged() {
        let presigned = "http://minio-internal:9000/bucket/key";
        assert_eq!(rewrite_to_public_endpoint(presigned, None), presigned);
    }

    #[test]
    fn matching_origin_returns_unchanged() {
        let presigned = "https://store.example.com:9000/bucket/key";
        let rewritten = rewrite_to_public_endpoint(presigned, Some("https://store.example.com:9000"));
        assert_eq!(rewritten, presigned);
    }

    #[test]
    fn unparseable_url_returns_unchanged() {
        let presigned = "not a url";
        assert_eq!(rewrite_to_public_endpoint(presigned, Some("https://cdn.example.com")), presigned);
    }
}
