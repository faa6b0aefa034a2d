use std::path::PathBuf;

/// Run-wide configuration surface (spec section 6), built the way
/// `radiate-engines::config::EngineConfig` composes an immutable config from
/// a builder.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    vivarium_hof_size: usize,
    deme_hof_size: usize,
    process_size: usize,
    population_size_vector: Vec<usize>,
    config_file: Option<PathBuf>,
    config_dump: Option<PathBuf>,
    log_file_name: Option<String>,
}

impl EngineConfig {
    pub fn builder(process_size: usize) -> EngineConfigBuilder {
        EngineConfigBuilder::new(process_size)
    }

    pub fn vivarium_hof_size(&self) -> usize {
        self.vivarium_hof_size
    }

    pub fn deme_hof_size(&self) -> usize {
        self.deme_hof_size
    }

    pub fn process_size(&self) -> usize {
        self.process_size
    }

    pub fn population_size_vector(&self) -> &[usize] {
        &self.population_size_vector
    }

    pub fn config_file(&self) -> Option<&PathBuf> {
        self.config_file.as_ref()
    }

    pub fn config_dump(&self) -> Option<&PathBuf> {
        self.config_dump.as_ref()
    }

    pub fn log_file_name(&self) -> Option<&str> {
        self.log_file_name.as_deref()
    }

    /// Resolves this rank's log file path, or `None` for stderr-only logging.
    pub fn log_path_for_rank(&self, rank: usize) -> Option<PathBuf> {
        self.log_file_name
            .as_deref()
            .map(|template| per_rank_log_path(template, rank))
    }

    #[cfg(feature = "serde")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> evo_error::EngineResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| evo_error::evo_err!(Configuration: "failed to read config file: {e}"))?;
        let serialized: SerializedConfig = serde_json::from_str(&raw)
            .map_err(|e| evo_error::evo_err!(Configuration: "failed to parse config file: {e}"))?;
        Ok(serialized.into_config())
    }
}

/// Builder for [`EngineConfig`], mirroring the teacher's builder-then-freeze
/// configuration idiom.
pub struct EngineConfigBuilder {
    vivarium_hof_size: usize,
    deme_hof_size: usize,
    process_size: usize,
    population_size_vector: Vec<usize>,
    config_file: Option<PathBuf>,
    config_dump: Option<PathBuf>,
    log_file_name: Option<String>,
}

impl EngineConfigBuilder {
    pub fn new(process_size: usize) -> Self {
        EngineConfigBuilder {
            vivarium_hof_size: 0,
            deme_hof_size: 0,
            process_size,
            population_size_vector: Vec::new(),
            config_file: None,
            config_dump: None,
            log_file_name: None,
        }
    }

    pub fn vivarium_hof_size(mut self, size: usize) -> Self {
        self.vivarium_hof_size = size;
        self
    }

    pub fn deme_hof_size(mut self, size: usize) -> Self {
        self.deme_hof_size = size;
        self
    }

    pub fn population_size_vector(mut self, sizes: Vec<usize>) -> Self {
        self.population_size_vector = sizes;
        self
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn config_dump(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_dump = Some(path.into());
        self
    }

    pub fn log_file_name(mut self, name: impl Into<String>) -> Self {
        self.log_file_name = Some(name.into());
        self
    }

    pub fn build(self) -> evo_error::EngineResult<EngineConfig> {
        evo_error::ensure!(
            !self.population_size_vector.is_empty(),
            Configuration: "population_size_vector is required"
        );
        Ok(EngineConfig {
            vivarium_hof_size: self.vivarium_hof_size,
            deme_hof_size: self.deme_hof_size,
            process_size: self.process_size,
            population_size_vector: self.population_size_vector,
            config_file: self.config_file,
            config_dump: self.config_dump,
            log_file_name: self.log_file_name,
        })
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct SerializedConfig {
    #[serde(default)]
    vivarium_hof_size: usize,
    #[serde(default)]
    deme_hof_size: usize,
    process_size: usize,
    population_size_vector: Vec<usize>,
    #[serde(default)]
    config_dump: Option<PathBuf>,
    #[serde(default)]
    log_file_name: Option<String>,
}

#[cfg(feature = "serde")]
impl SerializedConfig {
    fn into_config(self) -> EngineConfig {
        EngineConfig {
            vivarium_hof_size: self.vivarium_hof_size,
            deme_hof_size: self.deme_hof_size,
            process_size: self.process_size,
            population_size_vector: self.population_size_vector,
            config_file: None,
            config_dump: self.config_dump,
            log_file_name: self.log_file_name,
        }
    }
}

/// Interpolates a rank into a log file name template. A `{rank}` placeholder
/// is substituted directly; otherwise the rank is inserted before the file
/// extension, matching the tokenizer in the original
/// `MPI_Coev_FitnessEvaluationClient.cpp::initialize`, which splits the name
/// on `.` and reinserts the rank.
pub fn per_rank_log_path(template: &str, rank: usize) -> PathBuf {
    if template.contains("{rank}") {
        return PathBuf::from(template.replace("{rank}", &rank.to_string()));
    }

    match template.rsplit_once('.') {
        Some((stem, ext)) => PathBuf::from(format!("{stem}-{rank}.{ext}")),
        None => PathBuf::from(format!("{template}-{rank}")),
    }
}
