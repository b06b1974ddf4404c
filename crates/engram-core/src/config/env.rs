use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_memory();
        self.apply_env_overrides_embedding();
    }

    fn apply_env_overrides_memory(&mut self) {
        if let Ok(v) = std::env::var("ENGRAM_MEMORY_BACKEND") {
            self.memory.backend = v;
        }
        if let Ok(v) = std::env::var("ENGRAM_MEMORY_PATH") {
            self.memory.path = v;
        }
        if let Ok(v) = std::env::var("ENGRAM_MEMORY_EMBEDDING_DIM") {
            if let Ok(dim) = v.parse::<usize>() {
                self.memory.embedding_dim = Some(dim);
            } else {
                tracing::warn!("ignoring invalid ENGRAM_MEMORY_EMBEDDING_DIM value: {v}");
            }
        }
        if let Ok(v) = std::env::var("ENGRAM_SPLITTER_CHUNK_SIZE") {
            if let Ok(size) = v.parse::<usize>() {
                self.splitter.chunk_size = size;
            } else {
                tracing::warn!("ignoring invalid ENGRAM_SPLITTER_CHUNK_SIZE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("ENGRAM_SPLITTER_CHUNK_OVERLAP") {
            if let Ok(overlap) = v.parse::<usize>() {
                self.splitter.chunk_overlap = overlap;
            } else {
                tracing::warn!("ignoring invalid ENGRAM_SPLITTER_CHUNK_OVERLAP value: {v}");
            }
        }
    }

    fn apply_env_overrides_embedding(&mut self) {
        if let Ok(v) = std::env::var("ENGRAM_EMBEDDING_BASE_URL") {
            self.embedding.base_url = v;
        }
        if let Ok(v) = std::env::var("ENGRAM_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("ENGRAM_EMBEDDING_TIMEOUT") {
            if let Ok(secs) = v.parse::<u64>() {
                self.embedding.timeout_secs = secs;
            } else {
                tracing::warn!("ignoring invalid ENGRAM_EMBEDDING_TIMEOUT value: {v}");
            }
        }
    }
}
