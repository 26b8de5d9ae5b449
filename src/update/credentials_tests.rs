// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for credential acquisition.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::config::AuthMode;
    use crate::errors::CredentialError;
    use crate::update::credentials::{ensure_credentials, CredentialProvider, KinitCredentials};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl CredentialProvider for CountingProvider {
        async fn acquire(&self) -> Result<(), CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CredentialError::AcquisitionFailed {
                    principal: "host/h.example.com".to_string(),
                    reason: "keytab not found".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_kinit_args() {
        let with_keytab =
            KinitCredentials::new(Some(PathBuf::from("/etc/krb5.keytab")), "host/h.example.com");
        assert_eq!(
            with_keytab.args(),
            vec!["-k", "-t", "/etc/krb5.keytab", "host/h.example.com"]
        );

        let without = KinitCredentials::new(None, "H$@EXAMPLE.COM");
        assert_eq!(without.args(), vec!["-k", "H$@EXAMPLE.COM"]);
    }

    #[tokio::test]
    async fn test_skipped_for_unsigned_and_tsig() {
        let provider = CountingProvider::new(true);
        assert!(ensure_credentials(Some(&provider), &AuthMode::None, false)
            .await
            .is_ok());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_skipped_for_dry_run() {
        let provider = CountingProvider::new(true);
        assert!(ensure_credentials(Some(&provider), &AuthMode::GssTsig, true)
            .await
            .is_ok());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_propagates_for_gss() {
        let provider = CountingProvider::new(true);
        let err = ensure_credentials(Some(&provider), &AuthMode::GssTsigLegacy, false)
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::AcquisitionFailed { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_provider_uses_ticket_cache() {
        assert!(ensure_credentials(None, &AuthMode::GssTsig, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_kinit_binary_fails() {
        let kinit = KinitCredentials::new(None, "host/h.example.com")
            .with_binary("/nonexistent/kinit");
        let err = kinit.acquire().await.unwrap_err();
        assert!(matches!(
            err,
            CredentialError::AcquisitionFailed { ref principal, .. } if principal == "host/h.example.com"
        ));
    }
}
