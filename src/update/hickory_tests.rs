// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the hickory update executor.

#[cfg(test)]
mod tests {
    use hickory_client::rr::{DNSClass, RData};
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use crate::config::{AuthMode, Transport, UpdateTarget};
    use crate::dns::RecordType;
    use crate::errors::{ConfigError, UpdateError};
    use crate::reconcile::plan::Operation;
    use crate::testing::rec;
    use crate::tsig::{HmacAlgorithm, TsigKeyData};
    use crate::update::hickory::{to_record, HickoryUpdateExecutor};
    use crate::update::{UpdateExecutor, UpdateRequest};

    fn server() -> SocketAddr {
        "192.0.2.53:53".parse().unwrap()
    }

    #[test]
    fn test_new_rejects_gss_tsig() {
        for auth in [AuthMode::GssTsig, AuthMode::GssTsigLegacy] {
            let target = UpdateTarget {
                auth,
                ..UpdateTarget::default()
            };
            let err = HickoryUpdateExecutor::new(&target, server()).unwrap_err();
            assert!(matches!(err, ConfigError::UnsupportedAuth { .. }));
        }
    }

    #[test]
    fn test_new_unsigned_and_tsig() {
        let unsigned = HickoryUpdateExecutor::new(&UpdateTarget::default(), server()).unwrap();
        assert!(!unsigned.is_signed());

        let target = UpdateTarget {
            auth: AuthMode::Tsig {
                key_file: PathBuf::from("/etc/ddns.key"),
                key: TsigKeyData {
                    name: "ddns-key".to_string(),
                    algorithm: HmacAlgorithm::HmacSha256,
                    secret: "c2VjcmV0LWtleS1ieXRlcw==".to_string(),
                },
            },
            ..UpdateTarget::default()
        };
        let signed = HickoryUpdateExecutor::new(&target, server()).unwrap();
        assert!(signed.is_signed());
    }

    #[tokio::test]
    async fn test_unknown_zone_is_not_guessed() {
        let executor = HickoryUpdateExecutor::new(&UpdateTarget::default(), server()).unwrap();
        let request = UpdateRequest {
            server: Some("192.0.2.53".to_string()),
            zone: None,
            source_address: None,
            transport: Transport::Udp,
            operations: vec![Operation::add(
                "h.sub.example.com",
                3600,
                RecordType::A,
                "198.51.100.9",
            )],
        };

        let err = executor.apply(&request).await.unwrap_err();
        assert_eq!(
            err,
            UpdateError::UnknownZone {
                name: "h.sub.example.com".to_string()
            }
        );
    }

    #[test]
    fn test_to_record_a() {
        let record =
            to_record(&Operation::add("h.example.com", 3600, RecordType::A, "198.51.100.9"))
                .unwrap();
        assert_eq!(record.name().to_string(), "h.example.com.");
        assert_eq!(record.ttl(), 3600);
        assert_eq!(record.dns_class(), DNSClass::IN);
        assert!(matches!(record.data(), Some(RData::A(a)) if a.to_string() == "198.51.100.9"));
    }

    #[test]
    fn test_to_record_ptr_delete() {
        let observed = rec(
            "9.100.51.198.in-addr.arpa",
            300,
            RecordType::PTR,
            "h.example.com",
        );
        let record = to_record(&Operation::delete(&observed)).unwrap();
        assert_eq!(record.name().to_string(), "9.100.51.198.in-addr.arpa.");
        assert!(
            matches!(record.data(), Some(RData::PTR(ptr)) if ptr.to_string() == "h.example.com.")
        );
    }

    #[test]
    fn test_to_record_rejects_family_mismatch() {
        assert!(to_record(&Operation::add("h.example.com", 60, RecordType::A, "2001:db8::1")).is_err());
        assert!(
            to_record(&Operation::add("h.example.com", 60, RecordType::AAAA, "198.51.100.9"))
                .is_err()
        );
        assert!(to_record(&Operation::add("h.example.com", 60, RecordType::TXT, "v=1")).is_err());
    }
}
