//! Pieces shared by the `object_store`-backed cloud backends.

use http::{HeaderMap, HeaderName, HeaderValue};
use object_store::{Attribute, Attributes, ClientOptions, Error as ObjectStoreError, PutOptions};

use crate::traits::StorageError;

/// Client options that attach a canned public-read ACL header to every request.
///
/// `object_store` has no ACL API, so the ACL rides on the upload itself.
pub(crate) fn public_read_client_options(acl_header: &'static str) -> ClientOptions {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(acl_header),
        HeaderValue::from_static("public-read"),
    );
    ClientOptions::new().with_default_headers(headers)
}

pub(crate) fn put_options(content_type: &str) -> PutOptions {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.to_string().into());
    PutOptions {
        attributes,
        ..Default::default()
    }
}

/// Map `object_store` failures onto the pipeline's storage taxonomy.
pub(crate) fn classify(error: ObjectStoreError, key: &str) -> StorageError {
    match error {
        ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
        ObjectStoreError::PermissionDenied { .. } | ObjectStoreError::Unauthenticated { .. } => {
            StorageError::AuthFailure(format!("{}: {}", key, error))
        }
        other => {
            let message = other.to_string();
            if is_quota_message(&message) {
                StorageError::QuotaExceeded(format!("{}: {}", key, message))
            } else {
                StorageError::NetworkFailure(format!("{}: {}", key, message))
            }
        }
    }
}

fn is_quota_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["quota", "slowdown", "slow down", "too many requests", "rate limit", "429"]
        .iter()
        .any(|needle| lower.contains(needle))
}
