//! Broader memory abilities: ordering events in time, tracking entities,
//! following preferences as they change, joining several memories into one
//! answer, and recalling things said once long ago.

use super::seeded;
use crate::memory::MemoryRecord;
use crate::scenario::{Category, Scenario};

fn fact(content: &str, labels: &[&str], subject: &str) -> MemoryRecord {
    MemoryRecord::fact(content, labels, subject)
}

pub fn scenarios() -> Vec<Scenario> {
    let mut all = temporal();
    all.extend(entities());
    all.extend(preference_evolution());
    all.extend(multi_hop());
    all.extend(long_term());
    all.extend(social());
    all.extend(contradictions());
    all.extend(spatial());
    all.extend(personal());
    all
}

fn temporal() -> Vec<Scenario> {
    vec![
        seeded(
            "temporal_1_event_order",
            Category::TemporalReasoning,
            "What was the sequence of major ctxovrflw releases this month? List them in order.",
            "v0.3.7 (Feb 8), v0.3.8 (Feb 10), v0.3.9 (Feb 12), v0.4.0 (Feb 14), v0.4.2 (Feb 16)",
            &["v0.3.7", "v0.3.8", "v0.3.9", "v0.4.0", "v0.4.2"],
            "shipped on February",
            vec![
                fact("Release v0.3.7 shipped on February 8, 2026. Changes: mandatory E2E encryption for sync, ONNX embedder singleton (recall latency 9300ms to 3ms).", &["release", "v0.3.7", "timeline"], "ctxovrflw"),
                fact("Release v0.3.8 shipped on February 10, 2026. Changes: hybrid search with RRF (k=60), signup flow fix, dashboard crash fix.", &["release", "v0.3.8", "timeline"], "ctxovrflw"),
                fact("Release v0.3.9 shipped on February 12, 2026. Changes: JWT session tokens for web frontend, cross-device PIN fix.", &["release", "v0.3.9", "timeline"], "ctxovrflw"),
                fact("Release v0.4.0 shipped on February 14, 2026. Changes: per-device API keys, devices table migration.", &["release", "v0.4.0", "timeline"], "ctxovrflw"),
                fact("Release v0.4.2 shipped on February 16, 2026. Changes: server-side PIN salt, eliminated email dependency from key derivation.", &["release", "v0.4.2", "timeline"], "ctxovrflw"),
            ],
        ),
        seeded(
            "temporal_2_recency",
            Category::TemporalReasoning,
            "What was the most recent bug we fixed and when?",
            "The tokio blocking_lock panic in sync that crashed SSE connections, fixed on February 16 in v0.4.4",
            &["blocking_lock", "panic", "SSE", "v0.4.4", "February 16"],
            "Bug fix February",
            vec![
                fact("Bug fix February 10: signup email verification polling was broken, returning 404 instead of polling status.", &["bug", "fix", "timeline"], "ctxovrflw"),
                fact("Bug fix February 14: cross-device PIN verification failed because derive_key() used email as salt, which differed between devices.", &["bug", "fix", "timeline"], "ctxovrflw"),
                fact("Bug fix February 16: tokio::sync::Mutex::blocking_lock() panicked in auto-sync task, crashing tokio worker threads and killing active SSE/MCP connections. Fixed by switching to std::sync::Mutex. Shipped in v0.4.4.", &["bug", "fix", "timeline", "recent"], "ctxovrflw"),
            ],
        ),
        seeded(
            "temporal_3_duration",
            Category::TemporalReasoning,
            "How long did it take to go from the first version with cloud sync to the version with E2E encryption?",
            "Cloud sync arrived in v0.2.5 (late January) and mandatory E2E encryption in v0.3.7 (February 8), roughly 1-2 weeks",
            &["v0.2.5", "v0.3.7", "sync", "encryption", "weeks"],
            "cloud sync",
            vec![
                fact("v0.2.5 (late January 2026): First version with cloud sync support. Memories could be pushed/pulled to the cloud API.", &["release", "milestone", "sync"], "ctxovrflw"),
                fact("v0.3.7 (February 8, 2026): Mandatory E2E encryption for all cloud sync. No plaintext sync path allowed.", &["release", "milestone", "encryption"], "ctxovrflw"),
            ],
        ),
    ]
}

fn entities() -> Vec<Scenario> {
    vec![
        seeded(
            "entity_1_people_roles",
            Category::EntityTracking,
            "Who are all the people involved in ctxovrflw development and what are their roles?",
            "Max (founder, main dev), Jake (Rust Discord, ONNX CI fix), Sarah (designer beta tester), Tom (backend dev beta tester), Lisa (PM at potential enterprise client)",
            &["Max", "Jake", "Sarah", "Tom", "Lisa"],
            "ctxovrflw",
            vec![
                fact("Max B is the founder and primary developer of ctxovrflw. Software engineer based in Boston, EST timezone.", &["people", "team"], "Max"),
                fact("Jake from Rust Discord helped debug the ONNX runtime linking of ctxovrflw on ARM64. Contributed CI fix for cross-compilation.", &["people", "contributor"], "Jake"),
                fact("Sarah is a designer who beta-tested ctxovrflw. Found the init wizard confusing, recommended better defaults.", &["people", "beta-tester"], "Sarah"),
                fact("Tom is a backend developer who beta-tested ctxovrflw. Reported recall latency issue (9+ seconds) before singleton fix.", &["people", "beta-tester"], "Tom"),
                fact("Lisa is a PM at a fintech startup, potential enterprise client for ctxovrflw. Interested in team shared memory spaces.", &["people", "lead", "enterprise"], "Lisa"),
            ],
        ),
        seeded(
            "entity_2_org_details",
            Category::EntityTracking,
            "What companies or organizations have expressed interest in ctxovrflw?",
            "Lisa's fintech startup wants team shared memories, a DevOps agency asked about self-hosted deployment, and the Rust Discord community has been supportive",
            &["fintech", "Lisa", "DevOps", "self-hosted", "Rust Discord"],
            "ctxovrflw",
            vec![
                fact("Lisa's fintech startup (~50 devs) interested in ctxovrflw for team shared memory. They want on-prem deployment. Key concern: SOC2 compliance.", &["leads", "enterprise", "fintech"], "enterprise-leads"),
                fact("A DevOps agency asked about self-hosted ctxovrflw deployment for their clients. Want to bundle with their CI/CD offering.", &["leads", "enterprise", "devops"], "enterprise-leads"),
                fact("Rust Discord community has been supportive of ctxovrflw. Several members testing it. Jake contributed code.", &["community", "rust", "marketing"], "community"),
            ],
        ),
    ]
}

fn preference_evolution() -> Vec<Scenario> {
    vec![
        seeded(
            "pref_evo_1_tech_choice",
            Category::PreferenceEvolution,
            "How has our approach to database encryption changed over the project lifetime?",
            "No encryption, then optional encryption, then mandatory E2E after a security audit; later the email-based salt was replaced by a server-side salt",
            &["optional", "mandatory", "PIN", "plaintext", "security audit"],
            "encryption",
            vec![
                fact("Early ctxovrflw (v0.1.x): No encryption for cloud sync. Memories stored in plaintext on server.", &["history", "encryption", "evolution"], "ctxovrflw"),
                fact("v0.2.x: Added optional E2E encryption. Users could set a PIN to encrypt before sync.", &["history", "encryption", "evolution"], "ctxovrflw"),
                fact("v0.3.7: Made E2E encryption mandatory after security audit found plaintext sync was a liability. No opt-out.", &["history", "encryption", "evolution"], "ctxovrflw"),
                fact("v0.4.2: Switched PIN encryption key derivation from email-based salt to server-side random salt. Email in salt caused cross-device failures.", &["history", "encryption", "evolution"], "ctxovrflw"),
            ],
        ),
        seeded(
            "pref_evo_2_opinion_change",
            Category::PreferenceEvolution,
            "What's Max's current stance on using AI for marketing, and how has it changed?",
            "Initially skeptical, then tried Moltbook engagement and found genuine community interaction works; now 'community member first, not advertiser'",
            &["skeptical", "Moltbook", "genuine", "community", "advertiser"],
            "Max",
            vec![
                fact("January 2026: Max initially skeptical about using AI for marketing. Worried it would come across as spammy and inauthentic.", &["preference", "marketing", "evolution"], "Max"),
                fact("February 2026: Max tried Moltbook AI social network for ctxovrflw outreach with strict rules: max 2-3 comments per run, genuine insights only, community member first not advertiser.", &["preference", "marketing", "evolution"], "Max"),
                MemoryRecord::preference("Current stance: Max believes AI-assisted community engagement works if it's genuine. Quality over quantity. Reply to help, not to sell.", &["preference", "marketing", "current"], "Max"),
            ],
        ),
    ]
}

fn multi_hop() -> Vec<Scenario> {
    vec![
        seeded(
            "multihop_1_cause_effect",
            Category::MultiHop,
            "Why did our benchmark results improve dramatically between the first and second run?",
            "The first run scored 69% because a blocking_lock panic killed tokio workers serving SSE; switching to std::sync::Mutex made MCP recall reliable",
            &["mutex", "tokio", "std::sync", "MCP", "recall", "69%"],
            "benchmark",
            vec![
                fact("First benchmark run (Feb 16 morning): ctxovrflw mode scored only 69% coverage. 5 out of 11 scenarios showed 'service unreachable' when calling MCP recall.", &["benchmark", "results", "failure"], "benchmarks"),
                fact("Root cause of the failed benchmark run: tokio::sync::Mutex::blocking_lock() in sync/mod.rs panicked inside async context, crashing tokio worker threads that were serving SSE connections.", &["bug", "root-cause", "mutex"], "ctxovrflw"),
                fact("Fix: Switched global embedder from tokio::sync::Mutex to std::sync::Mutex. Second benchmark run: 98% coverage, 0 failures.", &["fix", "benchmark", "improvement"], "ctxovrflw"),
            ],
        ),
        seeded(
            "multihop_2_dependency_chain",
            Category::MultiHop,
            "What's the connection between Jake's contribution and our benchmark improvement?",
            "Jake's ONNX ARM64 CI fix enabled the embedder; its singleton used tokio::Mutex which panicked; std::sync::Mutex fixed the benchmarks",
            &["Jake", "ONNX", "ARM64", "embedder", "Mutex"],
            "ONNX",
            vec![
                fact("Jake contributed the ONNX runtime CI fix for ARM64, enabling cross-platform ONNX builds.", &["contribution", "onnx", "ci"], "Jake"),
                fact("ONNX embedder is loaded as a global singleton (Arc<Mutex<Embedder>>) at daemon startup, shared across HTTP, MCP, and sync tasks.", &["architecture", "onnx", "singleton"], "ctxovrflw"),
                fact("The ONNX embedder singleton originally used tokio::sync::Mutex. The sync task called blocking_lock() which panicked inside the tokio runtime.", &["bug", "mutex", "onnx"], "ctxovrflw"),
                fact("Switching to std::sync::Mutex fixed the panic. The ONNX embedder (enabled by Jake's CI work) now works reliably.", &["fix", "onnx", "mutex"], "ctxovrflw"),
            ],
        ),
        seeded(
            "multihop_3_impact_analysis",
            Category::MultiHop,
            "If we downgraded a Pro user to Free tier, what specific features would they lose?",
            "Hybrid search, knowledge graph, webhooks, consolidation, context synthesis, cloud sync, and unlimited memories (Free caps at 100)",
            &["hybrid", "knowledge graph", "webhooks", "consolidation", "cloud sync", "100"],
            "tier",
            vec![
                fact("Free tier features: keyword search only, 100 memory limit, local storage only, 1 device.", &["pricing", "free", "limits"], "ctxovrflw"),
                fact("Pro tier features: hybrid search (semantic + keyword + RRF), unlimited memories, knowledge graph, webhooks, consolidation, context synthesis, unlimited devices.", &["pricing", "pro", "features"], "ctxovrflw"),
                fact("Cloud sync requires Standard tier or above. Free users can only use local storage.", &["pricing", "sync", "limits"], "ctxovrflw"),
            ],
        ),
    ]
}

fn long_term() -> Vec<Scenario> {
    vec![
        seeded(
            "longterm_1_origin",
            Category::LongTermConsistency,
            "Why was ctxovrflw created? What was the original motivation?",
            "Every AI session started from zero; context windows are expensive and ephemeral; Max wanted persistent, private, cross-agent memory",
            &["started from zero", "context window", "persistent", "private", "MCP"],
            "origin story",
            vec![fact("ctxovrflw origin story: Max was frustrated that every AI coding session started from zero. Context windows are expensive and ephemeral. He wanted persistent memory that's private (local-first), works across any AI tool (MCP), and syncs across devices.", &["origin", "motivation", "founding"], "ctxovrflw")],
        ),
        seeded(
            "longterm_2_early_decision",
            Category::LongTermConsistency,
            "Why did we choose Rust for the daemon instead of Python or Go?",
            "Performance without GC pauses, single binary distribution, memory safety, and straightforward SQLite FFI",
            &["performance", "binary", "memory safety", "SQLite", "GC"],
            "Architecture decision",
            vec![fact("Architecture decision: Rust chosen for ctxovrflw daemon. Reasons: sub-millisecond recall performance (no GC pauses), compiles to single static binary, memory safety guarantees for a long-running daemon, excellent SQLite FFI via rusqlite.", &["decision", "architecture", "rust"], "ctxovrflw")],
        ),
        seeded(
            "longterm_3_name",
            Category::LongTermConsistency,
            "How did ctxovrflw get its name?",
            "'context overflow': it catches what overflows the context window, with a nod to stackoverflow",
            &["context overflow", "overflow", "catches", "stackoverflow"],
            "Name origin",
            vec![fact("Name origin: ctxovrflw = 'context overflow'. When AI context windows overflow, knowledge is lost; ctxovrflw catches what overflows and persists it. Also a nod to stackoverflow.", &["name", "branding", "origin"], "ctxovrflw")],
        ),
    ]
}

fn social() -> Vec<Scenario> {
    vec![
        seeded(
            "social_1_reaction",
            Category::SocialContext,
            "How did the team react to the security audit findings?",
            "Max called the 0.0.0.0 binding a 'holy shit moment', made it P0, and was relieved the fix was a one-line change to 127.0.0.1",
            &["holy shit", "0.0.0.0", "P0", "127.0.0.1"],
            "reaction to security audit",
            vec![fact("Max's reaction to security audit: 'holy shit moment' when he saw the daemon was binding 0.0.0.0. Immediately classified as P0. Relieved the fix was one line changing it to 127.0.0.1.", &["reaction", "security", "sentiment"], "Max")],
        ),
        seeded(
            "social_2_frustration",
            Category::SocialContext,
            "What technical issue caused the most frustration during development?",
            "Cross-device PIN verification: 3 days to find an email salt mismatch that only broke across devices",
            &["PIN", "cross-device", "3 days", "email", "PBKDF2"],
            "Most frustrating bug",
            vec![fact("Most frustrating bug: cross-device PIN verification. Took 3 days to diagnose. derive_key() used email as PBKDF2 salt, but email casing differed slightly between devices. Fixed by moving to server-side random salt in v0.4.2.", &["frustration", "bug", "pin", "debugging"], "ctxovrflw")],
        ),
    ]
}

fn contradictions() -> Vec<Scenario> {
    vec![
        seeded(
            "contradiction_1_corrected",
            Category::ConflictResolution,
            "What database does ctxovrflw use for the cloud API?",
            "PostgreSQL via Drizzle ORM on Railway; SQLite was the early plan but could not handle concurrent writes",
            &["PostgreSQL", "Drizzle", "Railway"],
            "SQLite",
            vec![
                fact("Early plan: use SQLite for both daemon and cloud API. Simple, consistent stack.", &["decision", "database", "early"], "ctxovrflw-cloud"),
                fact("CORRECTION: Cloud API switched from SQLite to PostgreSQL (via Drizzle ORM on Railway). SQLite couldn't handle concurrent write access. Daemon still uses SQLite locally.", &["decision", "database", "correction", "current"], "ctxovrflw-cloud"),
            ],
        ),
        seeded(
            "contradiction_2_updated",
            Category::ConflictResolution,
            "How much does the Pro tier cost?",
            "$15/month; originally $10/month, raised after adding knowledge graph and webhooks",
            &["$15", "originally", "$10", "knowledge graph", "webhooks"],
            "Pro tier",
            vec![
                fact("Original pricing plan: Pro tier at $10/month with semantic search, unlimited memories, and cloud sync.", &["pricing", "original", "outdated"], "ctxovrflw"),
                fact("Updated pricing (current): Pro tier raised to $15/month after adding knowledge graph, webhooks, consolidation, and context synthesis.", &["pricing", "current", "updated"], "ctxovrflw"),
            ],
        ),
    ]
}

fn spatial() -> Vec<Scenario> {
    vec![
        seeded(
            "spatial_1_infrastructure",
            Category::SpatialContext,
            "Describe the full deployment infrastructure: where does each component run?",
            "Daemon locally (systemd), cloud API and PostgreSQL on Railway, website on Vercel, CI on GitHub Actions",
            &["Railway", "GitHub Actions", "PostgreSQL", "local", "systemd"],
            "infrastructure map",
            vec![fact("ctxovrflw infrastructure map: Daemon runs on the user's local machine (systemd service on Linux, launchd on Mac). Cloud API on Railway (Hono/Bun, PostgreSQL). Website on Vercel. CI on GitHub Actions on public repo M4cs/ctxovrflw-client. DNS on Cloudflare.", &["infrastructure", "deployment", "architecture"], "ctxovrflw")],
        ),
        seeded(
            "spatial_2_dev_setup",
            Category::SpatialContext,
            "What's Max's development environment setup?",
            "VPS at Hostinger, WSL on a Windows desktop, OpenClaw assistant via Telegram, VS Code",
            &["VPS", "Hostinger", "WSL", "OpenClaw", "Telegram", "VS Code"],
            "dev setup",
            vec![fact("Max's dev setup: primary development on a VPS at Hostinger (Linux x64). Secondary on WSL (Windows desktop). Uses the OpenClaw AI assistant for automation via Telegram. Editor: VS Code.", &["setup", "development", "environment"], "Max")],
        ),
    ]
}

fn personal() -> Vec<Scenario> {
    vec![
        seeded(
            "personal_1_schedule",
            Category::PersonalFacts,
            "When is Max usually available and when should I avoid messaging?",
            "EST (Boston), active 9 AM to midnight, avoid 1-8 AM, prefers async communication",
            &["EST", "Boston", "9 AM", "midnight", "async"],
            "availability",
            vec![MemoryRecord::preference("Max's availability: EST timezone (Boston). Typically active 9 AM to midnight EST. Avoid messaging 1 AM to 8 AM EST unless urgent. Prefers async communication.", &["schedule", "availability", "timezone"], "Max")],
        ),
        seeded(
            "personal_2_goals",
            Category::PersonalFacts,
            "What are Max's long-term career goals beyond ctxovrflw?",
            "Build wealth through software with multiple revenue streams from developer tools; financial independence",
            &["wealth", "software", "revenue", "developer tools", "financial independence"],
            "Max's goals",
            vec![fact("Max's goals: building wealth through software. ctxovrflw is the current focus, but he wants multiple revenue streams from developer tools. Long-term goal: financial independence through profitable software products.", &["goals", "career", "personal"], "Max")],
        ),
        seeded(
            "personal_3_pet_peeves",
            Category::PersonalFacts,
            "What annoys Max about working with AI assistants?",
            "Sycophancy, verbose responses, asking permission for obvious things, and losing context between sessions",
            &["sycophancy", "verbose", "permission", "context", "sessions"],
            "pet peeves",
            vec![MemoryRecord::preference("Max's pet peeves with AI assistants: 1) Sycophancy, wants honest pushback. 2) Verbose responses. 3) Asking permission for obvious read-only tasks. 4) Losing context between sessions. 5) Corporate-speak and filler phrases.", &["pet-peeves", "ai", "preference"], "Max")],
        ),
    ]
}
