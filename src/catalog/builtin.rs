//! Compiled-in table of free subscription endpoints
//!
//! Each entry is one remote source of server definitions. Dated
//! endpoints publish under a path derived from the current day and use
//! `{yyyy}`/`{MM}`/`{dd}`/`{MMdd}`/`{yyyyMMdd}` template tokens, which
//! are expanded by [`super::template::expand`] at invocation time.

/// One fixed free endpoint
#[derive(Debug, Clone, Copy)]
pub struct BuiltinSource {
    /// Stable identifier, also used as the subscription id for imports
    pub id: &'static str,

    /// Human-readable label for notifications
    pub label: &'static str,

    /// Literal URL or URL template with date tokens
    pub url_template: &'static str,
}

/// The full fixed list, fetched as one batch by `subsync free`
pub const BUILTIN_SOURCES: &[BuiltinSource] = &[
    BuiltinSource {
        id: "freenode-me",
        label: "freenode.me",
        url_template: "https://freenode.me/wp-content/uploads/{yyyy}/{MM}/{MMdd}.txt",
    },
    BuiltinSource {
        id: "pawdroid-free-servers",
        label: "Pawdroid/Free-servers",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/Pawdroid/Free-servers/main/sub",
    },
    BuiltinSource {
        id: "freefq",
        label: "freefq",
        url_template: "https://bulinkbulink.com/freefq/free/master/v2",
    },
    BuiltinSource {
        id: "v2rayfree",
        label: "aiboboxx/v2rayfree",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/aiboboxx/v2rayfree/main/v2",
    },
    BuiltinSource {
        id: "umelabs",
        label: "umelabs",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/umelabs/node.umelabs.dev/master/Subscribe/v2ray.md",
    },
    BuiltinSource {
        id: "ripaojiedian",
        label: "ripaojiedian/freenode",
        url_template: "https://raw.gitmirror.com/ripaojiedian/freenode/main/sub",
    },
    BuiltinSource {
        id: "mianfeifq",
        label: "mianfeifq",
        url_template: "https://gitlab.com/mianfeifq/share/-/raw/master/data2023109.txt",
    },
    BuiltinSource {
        id: "mfuu",
        label: "mfuu/v2ray",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/mfuu/v2ray/master/clash.yaml",
    },
    BuiltinSource {
        id: "nodefree",
        label: "nodefree.org",
        url_template: "https://nodefree.org/dy/{yyyy}/{MM}/{yyyyMMdd}.txt",
    },
    BuiltinSource {
        id: "ermaozi",
        label: "ermaozi01/free_clash_vpn",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/ermaozi01/free_clash_vpn/main/subscribe/v2ray.txt",
    },
    BuiltinSource {
        id: "getnode",
        label: "getNode",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/a2470982985/getNode/main/v2ray.txt",
    },
    BuiltinSource {
        id: "freev2",
        label: "freev2/free",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/freev2/free/main/v2",
    },
    BuiltinSource {
        id: "adiwzx-free",
        label: "adiwzx/adifree",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/adiwzx/freenode/main/adifree.txt",
    },
    BuiltinSource {
        id: "adiwzx-speed",
        label: "adiwzx/adispeed",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/adiwzx/freenode/main/adispeed.txt",
    },
    BuiltinSource {
        id: "chromego-merge",
        label: "vveg26/chromego_merge",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/vveg26/chromego_merge/main/sub/shadowrocket_base64.txt",
    },
    BuiltinSource {
        id: "free-node-merge",
        label: "codingbox/Free-Node-Merge",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/codingbox/Free-Node-Merge/main/node.txt",
    },
    BuiltinSource {
        id: "vpn-free-nodes",
        label: "vpn-free-nodes",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/vpn-free-nodes/blob/master/node-list/{yyyy}-{MM}/{dd}日00时00分.md",
    },
    BuiltinSource {
        id: "zywchannel",
        label: "ZywChannel/free",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/ZywChannel/free/main/sub",
    },
    BuiltinSource {
        id: "freenodes-bpjzx1",
        label: "Lewis-1217/FreeNodes bpjzx1",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/Lewis-1217/FreeNodes/main/bpjzx1",
    },
    BuiltinSource {
        id: "freenodes-bpjzx2",
        label: "Lewis-1217/FreeNodes bpjzx2",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/Lewis-1217/FreeNodes/main/bpjzx2",
    },
    BuiltinSource {
        id: "ts-sf-fly",
        label: "ts-sf/fly",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/ts-sf/fly/main/v2",
    },
    BuiltinSource {
        id: "outnow",
        label: "outnow",
        url_template: "https://ghproxy.com/https://raw.githubusercontent.com/outnow/outnowmain/free",
    },
];

/// Look up a built-in source by id
pub fn find(id: &str) -> Option<&'static BuiltinSource> {
    BUILTIN_SOURCES.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_nonempty_and_ids_unique() {
        assert!(BUILTIN_SOURCES.len() >= 20);

        let mut ids: Vec<&str> = BUILTIN_SOURCES.iter().map(|s| s.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), BUILTIN_SOURCES.len());
    }

    #[test]
    fn test_find_known_and_unknown() {
        assert!(find("nodefree").is_some());
        assert!(find("no-such-source").is_none());
    }

    #[test]
    fn test_dated_templates_carry_tokens() {
        let dated: Vec<_> = BUILTIN_SOURCES
            .iter()
            .filter(|s| s.url_template.contains('{'))
            .collect();
        assert_eq!(dated.len(), 3);
        for source in dated {
            assert!(source.url_template.contains("{yyyy}"));
        }
    }
}
