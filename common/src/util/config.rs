use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub steiner: SteinerConfig,
    #[serde(default)]
    pub input: InputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            steiner: SteinerConfig::default(),
            input: InputConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SteinerConfig {
    /// Path-length weight in [0, 1]: 0 optimises wirelength only, 1
    /// source-to-sink path length only.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// World units per gcell.
    #[serde(default = "default_gcell_size")]
    pub gcell_size: f64,
    /// When set, every net's tree is dumped as an SVG into this directory.
    #[serde(default)]
    pub svg_dir: Option<String>,
}

impl Default for SteinerConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            gcell_size: default_gcell_size(),
            svg_dir: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_netlist_file")]
    pub netlist_file: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            netlist_file: default_netlist_file(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_alpha() -> f64 {
    0.3
}

fn default_gcell_size() -> f64 {
    1.0
}

fn default_netlist_file() -> String {
    "inputs/random.stn".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.steiner.alpha, 0.3);
        assert_eq!(config.input.output_dir, "output");
        assert!(config.steiner.svg_dir.is_none());
    }

    #[test]
    fn partial_sections_fill_in() {
        let config: Config = toml::from_str("[steiner]\nalpha = 0.7\n").unwrap();
        assert_eq!(config.steiner.alpha, 0.7);
        assert_eq!(config.steiner.gcell_size, 1.0);
    }
}
