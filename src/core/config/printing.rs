use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        if self.models.is_empty() {
            println!("  models: (none)");
        } else {
            println!("  models: {}", self.models.join(", "));
        }
        println!("  local-url: {}", self.local_url);
        println!("  summary-model: {}", self.summary_model);
        match &self.conversations_dir {
            Some(dir) => println!("  conversations-dir: {}", path_display(dir)),
            None => println!("  conversations-dir: (working directory)"),
        }
        match &self.default_backend {
            Some(backend) => println!("  default-backend: {backend}"),
            None => println!("  default-backend: (unset)"),
        }
        println!(
            "  cloud: deployment {} (api {})",
            self.cloud.deployment, self.cloud.api_version
        );
    }
}
