// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for host identity.

#[cfg(test)]
mod tests {
    use crate::errors::IdentityError;
    use crate::identity::{validate_fqdn, Identity, Ipv6Origin};
    use std::net::Ipv6Addr;

    #[test]
    fn test_validate_fqdn_normalizes() {
        assert_eq!(validate_fqdn("H.Example.COM.").unwrap(), "h.example.com");
    }

    #[test]
    fn test_validate_fqdn_requires_two_labels() {
        assert!(matches!(
            validate_fqdn("localhost"),
            Err(IdentityError::TooFewLabels { .. })
        ));
    }

    #[test]
    fn test_validate_fqdn_rejects_local_suffix() {
        assert!(matches!(
            validate_fqdn("laptop.local"),
            Err(IdentityError::ReservedSuffix { .. })
        ));
        assert!(matches!(
            validate_fqdn("laptop.LOCAL."),
            Err(IdentityError::ReservedSuffix { .. })
        ));
        // Only the final label is reserved
        assert!(validate_fqdn("h.local.example.com").is_ok());
    }

    #[test]
    fn test_validate_fqdn_rejects_empty_labels() {
        assert!(matches!(
            validate_fqdn("h..example.com"),
            Err(IdentityError::MalformedName { .. })
        ));
        assert!(matches!(
            validate_fqdn(""),
            Err(IdentityError::MissingHostName)
        ));
    }

    #[test]
    fn test_from_parts_joins_short_name_and_domain() {
        let identity = Identity::from_parts("h", Some("example.com")).unwrap();
        assert_eq!(identity.fqdn(), "h.example.com");
        assert_eq!(identity.short_name(), "h");
        assert_eq!(identity.domain(), "example.com");
    }

    #[test]
    fn test_from_parts_replaces_foreign_domain() {
        let identity = Identity::from_parts("h.corp.internal", Some("example.com")).unwrap();
        assert_eq!(identity.fqdn(), "h.example.com");
    }

    #[test]
    fn test_from_parts_keeps_qualified_host_in_domain() {
        let identity = Identity::from_parts("h.sub.example.com", Some("example.com")).unwrap();
        assert_eq!(identity.fqdn(), "h.sub.example.com");
    }

    #[test]
    fn test_from_parts_uses_qualified_host_without_domain() {
        let identity = Identity::from_parts("h.example.com", None).unwrap();
        assert_eq!(identity.fqdn(), "h.example.com");
    }

    #[test]
    fn test_from_parts_missing_domain() {
        assert!(matches!(
            Identity::from_parts("h", None),
            Err(IdentityError::MissingDomain { .. })
        ));
        assert!(matches!(
            Identity::from_parts("", Some("example.com")),
            Err(IdentityError::MissingHostName)
        ));
    }

    #[test]
    fn test_duplicate_addresses_are_ignored() {
        let mut identity = Identity::new("h.example.com").unwrap();
        identity.add_ipv4("198.51.100.9".parse().unwrap(), Some(3600));
        identity.add_ipv4("198.51.100.9".parse().unwrap(), Some(60));

        assert_eq!(identity.ipv4().len(), 1);
        assert_eq!(identity.ipv4()[0].ttl, Some(3600));
    }

    #[test]
    fn test_ipv6_orders_dhcpv6_before_slaac() {
        let slaac: Ipv6Addr = "2001:db8::aaaa".parse().unwrap();
        let dhcp: Ipv6Addr = "2001:db8::10".parse().unwrap();

        let mut identity = Identity::new("h.example.com").unwrap();
        identity.add_ipv6(slaac, None, Ipv6Origin::Slaac);
        identity.add_ipv6(dhcp, Some(1800), Ipv6Origin::Dhcpv6);

        let ordered: Vec<Ipv6Addr> = identity.ipv6().iter().map(|e| e.ip).collect();
        assert_eq!(ordered, vec![dhcp, slaac]);
        assert_eq!(identity.primary_ipv6().unwrap().ip, dhcp);
    }

    #[test]
    fn test_primary_ipv6_falls_back_to_slaac() {
        let slaac: Ipv6Addr = "2001:db8::aaaa".parse().unwrap();

        let mut identity = Identity::new("h.example.com").unwrap();
        identity.add_ipv6(slaac, None, Ipv6Origin::Slaac);

        assert_eq!(identity.primary_ipv6().unwrap().ip, slaac);
    }

    #[test]
    fn test_primary_ipv6_none_without_addresses() {
        let identity = Identity::new("h.example.com").unwrap();
        assert!(identity.primary_ipv6().is_none());
        assert!(!identity.has_addresses());
    }
}
