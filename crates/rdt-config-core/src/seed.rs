//! Demo data used to populate a fresh forest.

use crate::{ConfigNode, Forest};

struct DemoSubsystem {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    repo: &'static str,
    owner: &'static str,
    role: &'static str,
    avatar: u8,
    language: &'static str,
}

const ACCOUNTING: &[DemoSubsystem] = &[
    DemoSubsystem {
        id: "sub-1-1",
        name: "Accounting Frontend",
        description: "Web dashboard for ledger management.",
        repo: "acc-web-client",
        owner: "Sarah Jenkins",
        role: "Frontend Lead",
        avatar: 1,
        language: "React / TypeScript",
    },
    DemoSubsystem {
        id: "sub-1-2",
        name: "Accounting Backend",
        description: "Core microservice handling real-time ledger updates.",
        repo: "acc-core-api",
        owner: "Marcus Thorne",
        role: "Principal Engineer",
        avatar: 2,
        language: "Go v1.21",
    },
    DemoSubsystem {
        id: "sub-1-3",
        name: "Accounting Batch",
        description: "Nightly settlement processing jobs.",
        repo: "acc-batch-worker",
        owner: "David Kim",
        role: "Backend Engineer",
        avatar: 3,
        language: "Java / Spring Batch",
    },
];

const CLEARING: &[DemoSubsystem] = &[DemoSubsystem {
    id: "sub-2-1",
    name: "Clearing Gateway",
    description: "External API gateway for bank integrations.",
    repo: "clearing-gateway",
    owner: "Elena Rodriguez",
    role: "Tech Lead",
    avatar: 4,
    language: "Rust",
}];

fn system(
    id: &str,
    name: &str,
    description: &str,
    subsystems: &[DemoSubsystem],
) -> ConfigNode {
    let mut sys = ConfigNode::system(id, name).with_description(description);
    sys.children = subsystems
        .iter()
        .map(|d| {
            let mut sub = ConfigNode::subsystem(d.id, id, d.name).with_description(d.description);
            sub.git_url = Some(format!("https://github.com/company/{}.git", d.repo));
            sub.owner_name = Some(d.owner.to_string());
            sub.owner_role = Some(d.role.to_string());
            sub.owner_avatar = Some(format!("https://picsum.photos/200?random={}", d.avatar));
            sub.language = Some(d.language.to_string());
            sub
        })
        .collect();
    sys
}

/// Three systems: Accounting (three subsystems), Global Clearing (one) and
/// Risk Analytics (none).
pub fn demo_forest() -> Forest {
    Forest {
        systems: vec![
            system(
                "sys-1",
                "Accounting System",
                "Central processing engine for high-volume ledger transactions and global fiscal reporting.",
                ACCOUNTING,
            ),
            system(
                "sys-2",
                "Global Clearing",
                "Real-time settlement gateway for cross-border transactions.",
                CLEARING,
            ),
            system(
                "sys-3",
                "Risk Analytics",
                "Machine learning driven risk assessment and fraud detection platform.",
                &[],
            ),
        ],
    }
}
