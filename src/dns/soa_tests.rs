// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for SOA-chain zone authority discovery.

#[cfg(test)]
mod tests {
    use crate::dns::soa::{SoaResolver, UpdateRoute, ZoneAuthority};
    use crate::dns::RecordType;
    use crate::testing::FakeLookup;

    #[tokio::test]
    async fn test_walk_stops_at_first_soa() {
        let lookup = FakeLookup::new().with_soa("example.com", "ns1.example.com.");
        let mut resolver = SoaResolver::new(&lookup, None);

        let authority = resolver.resolve_authority("host.sub.example.com").await;

        assert_eq!(
            authority,
            Some(ZoneAuthority {
                zone: "example.com".to_string(),
                master: "ns1.example.com".to_string(),
            })
        );

        let queried: Vec<String> = lookup
            .calls_of_type(RecordType::SOA)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(
            queried,
            vec!["host.sub.example.com", "sub.example.com", "example.com"],
            "exactly two failed queries before the zone apex"
        );
    }

    #[tokio::test]
    async fn test_walk_terminates_without_soa() {
        let lookup = FakeLookup::new();
        let mut resolver = SoaResolver::new(&lookup, None);

        assert_eq!(resolver.resolve_authority("a.b.example").await, None);
        assert_eq!(
            lookup.calls_of_type(RecordType::SOA).len(),
            3,
            "one query per label, never past the root"
        );
    }

    #[tokio::test]
    async fn test_failed_soa_queries_count_as_absent() {
        let lookup = FakeLookup::new()
            .failing("sub.example.com", RecordType::SOA)
            .with_soa("example.com", "ns1.example.com");
        let mut resolver = SoaResolver::new(&lookup, None);

        let authority = resolver.resolve_authority("h.sub.example.com").await.unwrap();
        assert_eq!(authority.zone, "example.com");
    }

    #[tokio::test]
    async fn test_reverse_zone_resolved_independently() {
        let lookup = FakeLookup::new()
            .with_soa("example.com", "ns1.example.com")
            .with_soa("100.51.198.in-addr.arpa", "rev-master.example.net");
        let mut resolver = SoaResolver::new(&lookup, None);

        let forward = resolver.route_for("h.example.com").await;
        let reverse = resolver.route_for("9.100.51.198.in-addr.arpa").await;

        assert_eq!(forward.server.as_deref(), Some("ns1.example.com"));
        assert_eq!(reverse.server.as_deref(), Some("rev-master.example.net"));
        assert_eq!(reverse.zone.as_deref(), Some("100.51.198.in-addr.arpa"));
    }

    #[tokio::test]
    async fn test_cache_avoids_repeat_queries() {
        let lookup = FakeLookup::new().with_soa("example.com", "ns1.example.com");
        let mut resolver = SoaResolver::new(&lookup, None);

        resolver.resolve_authority("a.example.com").await;
        let before = lookup.calls().len();
        let again = resolver.resolve_authority("b.example.com").await;

        assert_eq!(again.unwrap().zone, "example.com");
        assert_eq!(
            lookup.calls().len(),
            before + 1,
            "only the new leaf name is queried"
        );
    }

    #[tokio::test]
    async fn test_pinned_server_keeps_server_and_finds_zone() {
        let lookup = FakeLookup::new()
            .with_soa("example.com", "ns1.example.com")
            .with_soa("8.b.d.0.1.0.0.2.ip6.arpa", "rev-master.example.net");
        let mut resolver = SoaResolver::new(&lookup, Some("192.0.2.53".to_string()));

        let forward = resolver.route_for("h.sub.example.com").await;
        assert_eq!(
            forward,
            UpdateRoute {
                server: Some("192.0.2.53".to_string()),
                zone: Some("example.com".to_string()),
            }
        );

        let owner = crate::dns::reverse_name(&"2001:db8::9".parse().unwrap());
        let reverse = resolver.route_for(&owner).await;
        assert_eq!(reverse.server.as_deref(), Some("192.0.2.53"));
        assert_eq!(reverse.zone.as_deref(), Some("8.b.d.0.1.0.0.2.ip6.arpa"));

        assert!(lookup
            .calls()
            .iter()
            .all(|c| c.server.as_deref() == Some("192.0.2.53")));
    }

    #[tokio::test]
    async fn test_pinned_server_without_soa_has_no_zone() {
        let lookup = FakeLookup::new();
        let mut resolver = SoaResolver::new(&lookup, Some("192.0.2.53".to_string()));

        assert_eq!(
            resolver.route_for("h.example.com").await,
            UpdateRoute {
                server: Some("192.0.2.53".to_string()),
                zone: None,
            }
        );
    }

    #[tokio::test]
    async fn test_route_without_authority_uses_default() {
        let lookup = FakeLookup::new();
        let mut resolver = SoaResolver::new(&lookup, None);

        assert_eq!(
            resolver.route_for("h.example.com").await,
            UpdateRoute::default()
        );
    }
}
