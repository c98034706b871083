use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AnalysisToml {
    pub output: Output,
    pub input: Input,
    pub analysis: AnalysisOptions,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Output {
    pub name: String,
    pub directory: String,
    /**Only json is supported */
    pub format: String,
    pub logging: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Input {
    /**JSON Lines file of dumped directory objects */
    pub objects: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisOptions {
    /**Target DNs */
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub target_sids: Vec<String>,
    /**Technique names to follow. Empty follows all */
    #[serde(default)]
    pub techniques: Vec<String>,
    /**DNs never expanded through */
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_true")]
    pub forward: bool,
    #[serde(default = "default_true")]
    pub include_cross_links: bool,
    #[serde(default = "default_true")]
    pub expand_attacker: bool,
}

fn default_max_depth() -> usize {
    crate::analysis::request::DEFAULT_MAX_DEPTH
}

fn default_true() -> bool {
    true
}
