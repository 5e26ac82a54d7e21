//! Facts, preferences and relationships that live only in memory, never in the
//! repository. Without recall the agent has nothing to answer from.

use super::seeded;
use crate::memory::MemoryRecord;
use crate::scenario::{Category, Scenario};

fn single(
    id: &str,
    category: Category,
    question: &str,
    truth: &str,
    keywords: &[&str],
    clear_query: &str,
    record: MemoryRecord,
) -> Scenario {
    seeded(id, category, question, truth, keywords, clear_query, vec![record])
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        // preferences
        single(
            "pref_1_coding_style",
            Category::Preferences,
            "What coding conventions does Max prefer for Rust projects?",
            "Max prefers snake_case, avoids unwrap in production, uses thiserror for errors, and wants clippy pedantic enabled",
            &["snake_case", "unwrap", "thiserror", "clippy"],
            "Rust coding preferences",
            MemoryRecord::preference(
                "Max's Rust coding preferences: snake_case everywhere, never use unwrap() in production code (use ? or expect with context), use thiserror for error types, always enable clippy::pedantic in CI",
                &["rust", "coding-style", "preference"],
                "Max",
            ),
        ),
        single(
            "pref_2_communication",
            Category::Preferences,
            "How does Max like to receive status updates?",
            "Brief bullet points, no fluff, only when something is blocked or done; no updates on routine progress",
            &["bullet", "brief", "blocked", "done", "routine"],
            "communication preference",
            MemoryRecord::preference(
                "Max's communication preference: brief bullet points only. Report when something is blocked or done. Don't send updates on routine progress; he'll check in when he wants to know.",
                &["communication", "preference", "updates"],
                "Max",
            ),
        ),
        // facts and decisions
        single(
            "fact_1_api_choice",
            Category::AccurateRetrieval,
            "Why did we choose Hono over Express for the cloud API?",
            "Hono runs on Bun natively, benchmarked 3x faster than Express, has built-in Zod validation, and is a modern stack",
            &["Hono", "Bun", "faster", "Express", "Zod"],
            "Hono",
            MemoryRecord::fact(
                "Decision: Cloud API uses Hono instead of Express. Reasons: runs natively on Bun (no adapter needed), benchmarked 3x faster than Express for our workload, built-in Zod validation support, and we wanted a modern TypeScript-first framework",
                &["decision", "cloud", "api", "hono"],
                "ctxovrflw-cloud",
            ),
        ),
        single(
            "fact_2_pricing",
            Category::AccurateRetrieval,
            "What are the ctxovrflw pricing tiers and what's included in each?",
            "Free: keyword search, 1000 memories, local only. Standard $5/mo: semantic search, 10K memories, cloud sync. Pro $15/mo: hybrid search, unlimited memories, knowledge graph, webhooks.",
            &["Free", "Standard", "Pro", "keyword", "semantic", "hybrid", "knowledge graph"],
            "ctxovrflw pricing",
            MemoryRecord::fact(
                "ctxovrflw pricing: Free tier with keyword search only, 1000 memory limit, local storage only. Standard $5/month with semantic search using ONNX embeddings, 10K memories, cloud sync with E2E encryption. Pro $15/month with hybrid search (semantic + keyword + RRF), unlimited memories, knowledge graph, webhooks, priority support.",
                &["pricing", "tiers", "product"],
                "ctxovrflw",
            ),
        ),
        // relationships and people
        single(
            "rel_1_collaborator",
            Category::Relationships,
            "Who helped with the ONNX integration and what was their contribution?",
            "Jake from the Rust Discord debugged ONNX runtime linking on ARM64 Linux, suggested ORT_DYLIB_PATH and contributed the cross-compilation CI fix",
            &["Jake", "ONNX", "ARM64", "ORT_DYLIB_PATH", "CI"],
            "ONNX runtime linking",
            MemoryRecord::fact(
                "Jake (from Rust Discord) helped debug ONNX runtime linking on ARM64 Linux. He found that ORT_DYLIB_PATH needs to be set explicitly for cross-compiled builds and contributed the CI fix for the ARM64 runner.",
                &["people", "onnx", "contribution", "ci"],
                "Jake",
            ),
        ),
        single(
            "rel_2_user_feedback",
            Category::Relationships,
            "What feedback did our early beta testers give us?",
            "Sarah found the init wizard confusing. Tom found recall latency too slow before the singleton fix. Both loved the privacy-first approach.",
            &["Sarah", "Tom", "init", "latency", "privacy"],
            "Beta tester feedback",
            MemoryRecord::fact(
                "Beta tester feedback summary: Sarah (designer) said the init wizard was confusing and needed better defaults. Tom (backend dev) reported recall was too slow (9+ seconds) before we added the ONNX singleton; recall latency is now ~3ms. Both testers praised the privacy-first, local-first architecture.",
                &["feedback", "beta", "users"],
                "beta-testers",
            ),
        ),
        // project context
        single(
            "proj_1_roadmap",
            Category::ProjectContext,
            "What are the next three features planned for ctxovrflw?",
            "Team/org shared memories, a VS Code extension with inline recall, and a web dashboard for memory visualization",
            &["team", "shared", "VS Code", "extension", "dashboard", "visualization"],
            "ctxovrflw roadmap",
            MemoryRecord::fact(
                "ctxovrflw roadmap next 3 features: 1) Team/org shared memory spaces so multiple agents can share a memory namespace. 2) VS Code extension with inline recall. 3) Web dashboard for memory visualization to browse, search, and manage memories in a GUI.",
                &["roadmap", "features", "planning"],
                "ctxovrflw",
            ),
        ),
        single(
            "proj_2_competitor",
            Category::ProjectContext,
            "How does ctxovrflw compare to Mem0 and what's our main differentiator?",
            "Mem0 is cloud-hosted Python; ctxovrflw is local-first Rust with zero-knowledge encryption and works with any AI tool via MCP",
            &["Mem0", "cloud", "local-first", "zero-knowledge", "MCP", "Rust"],
            "Competitive analysis",
            MemoryRecord::fact(
                "Competitive analysis: Mem0 is cloud-hosted, Python-based, requires their SDK. ctxovrflw differentiators: 1) local-first Rust daemon (fast, private), 2) zero-knowledge E2E encryption for sync (they store plaintext), 3) works with ANY AI tool via MCP protocol, 4) hybrid search vs their semantic-only",
                &["competition", "mem0", "differentiator"],
                "ctxovrflw",
            ),
        ),
        // knowledge left behind by other agents
        single(
            "agent_1_other_work",
            Category::CrossAgent,
            "What did the security audit agent find last week?",
            "Daemon bound 0.0.0.0, no input validation on content, no rate limiting on device auth. All fixed in v0.3.7.",
            &["0.0.0.0", "binding", "validation", "rate limiting", "device auth"],
            "Security audit agent findings",
            MemoryRecord::fact(
                "Security audit agent findings (last week): CRITICAL daemon binding 0.0.0.0 exposing API externally, fixed to 127.0.0.1. HIGH no input validation on memory content field, added max 100KB cap. MEDIUM no rate limiting on device auth endpoint, added 5/min limit. All fixes shipped in v0.3.7.",
                &["security", "audit", "agent-work", "findings"],
                "security-audit",
            ),
        ),
        single(
            "agent_2_deploy_history",
            Category::CrossAgent,
            "When was the last deployment and what version was it?",
            "v0.4.2 on February 16th, with server-side PIN salt and per-device API keys",
            &["v0.4.2", "February", "PIN", "salt", "per-device"],
            "Deployment log",
            MemoryRecord::fact(
                "Deployment log: v0.4.2 deployed on February 16, 2026. Changes: server-side PIN salt (eliminates email dependency in key derivation), per-device API keys (each device gets its own key). Deployed via scripts/deploy.sh, all 5 CI platforms built successfully.",
                &["deployment", "v0.4.2", "release"],
                "ctxovrflw",
            ),
        ),
        // reminders
        single(
            "remind_1_todo",
            Category::Reminders,
            "What was I supposed to do after the v0.4.2 deploy?",
            "Run ctxovrflw update on WSL and VPS, re-login on both devices, and reset the sync PIN since the salt mechanism changed",
            &["update", "WSL", "VPS", "login", "PIN", "reset"],
            "TODO after v0.4.2 deploy",
            MemoryRecord::fact(
                "TODO after v0.4.2 deploy: 1) Run 'ctxovrflw update' on both WSL and VPS. 2) Run 'ctxovrflw logout && ctxovrflw login' on WSL first, then VPS. 3) Reset sync PIN since key derivation changed from email salt to server salt.",
                &["todo", "reminder", "v0.4.2", "post-deploy"],
                "Max",
            ),
        ),
    ]
}
