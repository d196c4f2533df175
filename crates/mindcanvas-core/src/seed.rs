//! Demonstration strategy tree the canvas starts with.

use crate::model::{MindMap, Node, NodeStyle, Priority, Shape};
use crate::palette::{self, Swatch};

struct SeedNode {
    id: &'static str,
    text: &'static str,
    parent: Option<&'static str>,
    children: &'static [&'static str],
    notes: &'static str,
    swatch: Swatch,
    tags: &'static [&'static str],
    priority: Option<Priority>,
    progress: Option<u8>,
    icons: &'static [&'static str],
}

const SEED: &[SeedNode] = &[
    SeedNode {
        id: "root",
        text: "测试策略",
        parent: None,
        children: &["func", "perf", "security", "ui", "compat"],
        notes: "这是测试策略的主要节点，包含了所有测试类型。",
        swatch: palette::PRIMARY,
        tags: &["策略", "测试"],
        priority: None,
        progress: None,
        icons: &[],
    },
    SeedNode {
        id: "func",
        text: "功能测试",
        parent: Some("root"),
        children: &["login", "upload", "export"],
        notes: "验证系统的各项功能是否按照需求正常工作。",
        swatch: palette::SECONDARY,
        tags: &["功能"],
        priority: Some(Priority::High),
        progress: Some(75),
        icons: &["CheckCircle2"],
    },
    SeedNode {
        id: "perf",
        text: "性能测试",
        parent: Some("root"),
        children: &["response", "concurrency"],
        notes: "测试系统在不同负载条件下的性能表现。",
        swatch: palette::SECONDARY,
        tags: &["性能"],
        priority: Some(Priority::Medium),
        progress: Some(50),
        icons: &["Clock"],
    },
    SeedNode {
        id: "security",
        text: "安全测试",
        parent: Some("root"),
        children: &["validation", "auth"],
        notes: "验证系统的安全性和数据保护能力。",
        swatch: palette::SECONDARY,
        tags: &["安全"],
        priority: Some(Priority::High),
        progress: Some(30),
        icons: &["AlertCircle"],
    },
    SeedNode {
        id: "ui",
        text: "用户界面测试",
        parent: Some("root"),
        children: &[],
        notes: "测试用户界面的可用性和响应性。",
        swatch: palette::SECONDARY,
        tags: &["UI"],
        priority: Some(Priority::Medium),
        progress: Some(60),
        icons: &[],
    },
    SeedNode {
        id: "compat",
        text: "兼容性测试",
        parent: Some("root"),
        children: &[],
        notes: "测试系统在不同环境和设备上的兼容性。",
        swatch: palette::SECONDARY,
        tags: &["兼容性"],
        priority: Some(Priority::Low),
        progress: Some(20),
        icons: &[],
    },
    SeedNode {
        id: "login",
        text: "登录功能",
        parent: Some("func"),
        children: &[],
        notes: "测试用户登录功能的各种场景。",
        swatch: palette::ACCENT,
        tags: &["登录"],
        priority: Some(Priority::High),
        progress: Some(100),
        icons: &["CheckCircle2"],
    },
    SeedNode {
        id: "upload",
        text: "上传功能",
        parent: Some("func"),
        children: &[],
        notes: "测试文件上传功能的各种场景。",
        swatch: palette::ACCENT,
        tags: &["上传"],
        priority: Some(Priority::Medium),
        progress: Some(80),
        icons: &[],
    },
    SeedNode {
        id: "export",
        text: "导出功能",
        parent: Some("func"),
        children: &[],
        notes: "测试数据导出功能的各种场景。",
        swatch: palette::ACCENT,
        tags: &["导出"],
        priority: Some(Priority::Medium),
        progress: Some(60),
        icons: &[],
    },
    SeedNode {
        id: "response",
        text: "响应时间",
        parent: Some("perf"),
        children: &[],
        notes: "测试系统响应时间在不同负载下的表现。",
        swatch: palette::ACCENT,
        tags: &["响应时间"],
        priority: Some(Priority::High),
        progress: Some(40),
        icons: &["Clock"],
    },
    SeedNode {
        id: "concurrency",
        text: "并发用户",
        parent: Some("perf"),
        children: &[],
        notes: "测试系统在多用户并发访问时的性能。",
        swatch: palette::ACCENT,
        tags: &["并发"],
        priority: Some(Priority::Medium),
        progress: Some(30),
        icons: &[],
    },
    SeedNode {
        id: "validation",
        text: "数据验证",
        parent: Some("security"),
        children: &[],
        notes: "测试系统对输入数据的验证和过滤。",
        swatch: palette::ACCENT,
        tags: &["验证"],
        priority: Some(Priority::High),
        progress: Some(50),
        icons: &["AlertCircle"],
    },
    SeedNode {
        id: "auth",
        text: "权限控制",
        parent: Some("security"),
        children: &[],
        notes: "测试系统的权限控制和访问限制。",
        swatch: palette::ACCENT,
        tags: &["权限"],
        priority: Some(Priority::High),
        progress: Some(40),
        icons: &[],
    },
];

fn to_node(seed: &SeedNode) -> Node {
    Node {
        id: seed.id.to_string(),
        text: seed.text.to_string(),
        parent_id: seed.parent.map(str::to_string),
        children: seed.children.iter().map(|c| c.to_string()).collect(),
        collapsed: false,
        notes: Some(seed.notes.to_string()),
        style: NodeStyle::from_swatch(&seed.swatch, Shape::Rounded),
        tags: seed.tags.iter().map(|t| t.to_string()).collect(),
        priority: seed.priority,
        progress: seed.progress,
        icons: seed.icons.iter().map(|i| i.to_string()).collect(),
    }
}

/// The fixed demonstration tree: root `测试策略` with five strategy branches.
pub fn demo_strategy_map() -> MindMap {
    let nodes = SEED.iter().map(to_node).collect();
    match MindMap::from_nodes(nodes) {
        Ok(map) => map,
        Err(err) => {
            tracing::error!(error = %err, "demo strategy tree failed validation");
            MindMap::with_root(Node::new("root", "测试策略", None))
        }
    }
}
