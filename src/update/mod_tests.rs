// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for update request rendering.

#[cfg(test)]
mod tests {
    use crate::config::{AuthMode, Transport, UpdateTarget};
    use crate::dns::RecordType;
    use crate::reconcile::plan::Operation;
    use crate::testing::rec;
    use crate::update::{select_executor, UpdateRequest};

    fn request(operations: Vec<Operation>) -> UpdateRequest {
        UpdateRequest {
            server: None,
            zone: None,
            source_address: None,
            transport: Transport::Udp,
            operations,
        }
    }

    #[test]
    fn test_script_for_forward_replace() {
        let mut req = request(vec![
            Operation::delete(&rec("h.example.com", 300, RecordType::A, "198.51.100.1")),
            Operation::add("h.example.com", 3600, RecordType::A, "198.51.100.9"),
        ]);
        req.server = Some("192.0.2.53".to_string());
        req.zone = Some("example.com".to_string());

        assert_eq!(
            req.to_nsupdate_script(),
            "server 192.0.2.53 53\n\
             zone example.com.\n\
             update delete h.example.com. IN A 198.51.100.1\n\
             update add h.example.com. 3600 IN A 198.51.100.9\n\
             send\n"
        );
    }

    #[test]
    fn test_script_ptr_value_is_absolute() {
        let req = request(vec![Operation::add(
            "9.100.51.198.in-addr.arpa",
            3600,
            RecordType::PTR,
            "h.example.com",
        )]);

        assert_eq!(
            req.to_nsupdate_script(),
            "update add 9.100.51.198.in-addr.arpa. 3600 IN PTR h.example.com.\nsend\n"
        );
    }

    #[test]
    fn test_script_named_server_and_source() {
        let mut req = request(vec![Operation::add(
            "h.example.com",
            60,
            RecordType::AAAA,
            "2001:db8::1",
        )]);
        req.server = Some("ns1.example.com.".to_string());
        req.source_address = Some("192.0.2.10".parse().unwrap());

        let script = req.to_nsupdate_script();
        assert!(script.starts_with("server ns1.example.com\nlocal 192.0.2.10\n"));
    }

    #[test]
    fn test_script_without_zone_leaves_it_to_nsupdate() {
        let req = request(vec![Operation::add(
            "9.100.51.198.in-addr.arpa",
            60,
            RecordType::PTR,
            "h.example.com",
        )]);

        assert!(!req.to_nsupdate_script().contains("zone "));
    }

    #[test]
    fn test_select_executor() {
        let server = "192.0.2.53:53".parse().unwrap();
        let gss = UpdateTarget {
            auth: AuthMode::GssTsig,
            ..UpdateTarget::default()
        };

        assert_eq!(select_executor(true, &gss, server).unwrap().name(), "dry-run");
        assert_eq!(select_executor(false, &gss, server).unwrap().name(), "nsupdate");
        assert_eq!(
            select_executor(false, &UpdateTarget::default(), server)
                .unwrap()
                .name(),
            "hickory"
        );
    }
}
