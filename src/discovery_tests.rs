// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for address discovery.

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use crate::discovery::{
        parse_addresses, parse_default_route, AddressDiscovery, DiscoveredAddress,
        DiscoveredInterface, StaticDiscovery,
    };
    use crate::identity::{Identity, Ipv6Origin};

    const ADDR_OUTPUT: &str = "\
2: eth0    inet 192.0.2.10/24 brd 192.0.2.255 scope global dynamic noprefixroute eth0\\       valid_lft 86001sec preferred_lft 86001sec
2: eth0    inet 169.254.7.1/16 scope global eth0\\       valid_lft forever preferred_lft forever
2: eth0    inet6 2001:db8::10/128 scope global dynamic noprefixroute \\       valid_lft 7155sec preferred_lft 3555sec
2: eth0    inet6 2001:db8::abcd:1234/64 scope global temporary dynamic \\       valid_lft 86000sec preferred_lft 14000sec
2: eth0    inet6 2001:db8::211:22ff:fe33:4455/64 scope global dynamic mngtmpaddr \\       valid_lft 86000sec preferred_lft 14000sec
2: eth0    inet6 2001:db8::99/64 scope global deprecated dynamic \\       valid_lft 600sec preferred_lft 0sec
2: eth0    inet6 2001:db8::77/64 scope global tentative \\       valid_lft forever preferred_lft forever
2: eth0    inet6 fd00:1::5/64 scope global \\       valid_lft forever preferred_lft forever
2: eth0    inet6 fe80::211:22ff:fe33:4455/64 scope link \\       valid_lft forever preferred_lft forever
";

    #[test]
    fn test_parse_default_route() {
        let output = "default via 192.0.2.1 dev eth0 proto dhcp src 192.0.2.10 metric 100\n\
                      default via 192.0.2.254 dev wlan0 metric 600\n";
        assert_eq!(parse_default_route(output).as_deref(), Some("eth0"));
        assert_eq!(parse_default_route(""), None);
        assert_eq!(parse_default_route("192.0.2.0/24 dev eth0 scope link"), None);
    }

    #[test]
    fn test_parse_addresses_filters_and_tags() {
        let addresses = parse_addresses(ADDR_OUTPUT);
        let ips: Vec<String> = addresses.iter().map(|a| a.ip.to_string()).collect();
        assert_eq!(
            ips,
            vec!["192.0.2.10", "2001:db8::10", "2001:db8::211:22ff:fe33:4455"]
        );
        assert_eq!(addresses[1].origin, Ipv6Origin::Dhcpv6);
        assert_eq!(addresses[1].prefix_len, 128);
        assert_eq!(addresses[2].origin, Ipv6Origin::Slaac);
    }

    #[test]
    fn test_parse_addresses_ignores_garbage() {
        assert!(parse_addresses("not ip output\n3: lo inet bogus/8\n").is_empty());
    }

    #[tokio::test]
    async fn test_static_discovery_feeds_identity() {
        let discovery = StaticDiscovery::new(DiscoveredInterface {
            name: "eth0".to_string(),
            addresses: vec![
                DiscoveredAddress {
                    ip: "2001:db8::211:22ff:fe33:4455".parse::<IpAddr>().unwrap(),
                    prefix_len: 64,
                    origin: Ipv6Origin::Slaac,
                },
                DiscoveredAddress {
                    ip: "2001:db8::10".parse::<IpAddr>().unwrap(),
                    prefix_len: 128,
                    origin: Ipv6Origin::Dhcpv6,
                },
            ],
        });

        let found = discovery.discover(None).await.unwrap();
        let mut identity = Identity::new("h.example.com").unwrap();
        found.apply_to(&mut identity);

        let primary = identity.primary_ipv6().unwrap();
        assert_eq!(primary.ip.to_string(), "2001:db8::10");
        assert_eq!(identity.ipv6().len(), 2);
    }
}
