//! Artifact kinds.

/// The kinds of artifact a session stores.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    derive_more::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Free-text brief the story is generated from
    #[display("lore")]
    Lore,
    /// Numbered-section narrative
    #[display("story")]
    Story,
    /// Raw oracle JSON for the domain
    #[display("domain-json")]
    DomainJson,
    /// Raw oracle JSON for the problem
    #[display("problem-json")]
    ProblemJson,
    /// Rendered PDDL domain
    #[display("domain")]
    Domain,
    /// Rendered PDDL problem
    #[display("problem")]
    Problem,
    /// Planner plan file
    #[display("plan")]
    Plan,
    /// Captured planner output
    #[display("planner-log")]
    PlannerLog,
    /// Narrative-repair proposal shown for approval
    #[display("proposal")]
    Proposal,
    /// Story graph export
    #[display("graph")]
    Graph,
}

impl ArtifactKind {
    /// Directory name inside the session.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Lore => "lore",
            ArtifactKind::Story => "story",
            ArtifactKind::DomainJson => "domain-json",
            ArtifactKind::ProblemJson => "problem-json",
            ArtifactKind::Domain => "domain",
            ArtifactKind::Problem => "problem",
            ArtifactKind::Plan => "plan",
            ArtifactKind::PlannerLog => "planner-log",
            ArtifactKind::Proposal => "proposal",
            ArtifactKind::Graph => "graph",
        }
    }

    /// File extension for stored versions.
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Lore | ArtifactKind::Story | ArtifactKind::Proposal => "txt",
            ArtifactKind::DomainJson | ArtifactKind::ProblemJson | ArtifactKind::Graph => "json",
            ArtifactKind::Domain | ArtifactKind::Problem => "pddl",
            ArtifactKind::Plan => "plan",
            ArtifactKind::PlannerLog => "log",
        }
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use strum::IntoEnumIterator;
        ArtifactKind::iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown artifact kind: {}", s))
    }
}
