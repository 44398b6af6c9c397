//! Test helpers: a scripted media tool and a pipeline wired to in-memory storage.
//!
//! Run from workspace root: `cargo test -p rendition-processing`.

#![allow(dead_code)]

pub mod fake_tool;
pub mod fixtures;

use rendition_core::{
    PipelineConfig, RenditionConfig, RunConfig, StorageBackend, StorageConfig, ToolConfig,
};
use rendition_processing::PipelineOrchestrator;
use rendition_storage::{ArtifactStore, MemoryStorage};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use fake_tool::FakeTool;

pub const PUBLIC_BASE_URL: &str = "https://cdn.example.com";

/// Pipeline under test plus the fakes it talks to.
pub struct TestPipeline {
    pub orchestrator: PipelineOrchestrator,
    pub tool: Arc<FakeTool>,
    pub backend: Arc<MemoryStorage>,
    pub cancel: CancellationToken,
    pub work_dir: TempDir,
}

pub fn test_config(work_dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        tools: ToolConfig::default(),
        renditions: RenditionConfig::default(),
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            bucket: None,
            region: None,
            endpoint: None,
            public_read: true,
            credentials_path: None,
            local_path: None,
            local_base_url: None,
            public_base_url: None,
        },
        run: RunConfig {
            work_dir: work_dir.path().to_path_buf(),
            output_path: work_dir.path().join("response.json"),
            log_file: None,
            max_concurrent_sources: 1,
            environment: "test".to_string(),
        },
    }
}

pub fn setup_pipeline(tool: FakeTool) -> TestPipeline {
    setup_pipeline_with(tool, Arc::new(MemoryStorage::new(PUBLIC_BASE_URL)))
}

/// Same as `setup_pipeline`, but publishing into an existing backend (re-runs).
pub fn setup_pipeline_with(tool: FakeTool, backend: Arc<MemoryStorage>) -> TestPipeline {
    let work_dir = tempfile::tempdir().expect("Failed to create work directory");
    let config = test_config(&work_dir);
    let tool = Arc::new(tool);
    let cancel = CancellationToken::new();
    let store = ArtifactStore::new(backend.clone());

    let orchestrator = PipelineOrchestrator::new(&config, tool.clone(), store, cancel.clone());

    TestPipeline {
        orchestrator,
        tool,
        backend,
        cancel,
        work_dir,
    }
}

/// Names of workspace directories currently under the work root.
pub fn leftover_workspaces(pipeline: &TestPipeline) -> Vec<String> {
    std::fs::read_dir(pipeline.work_dir.path())
        .expect("work dir readable")
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with("rendition-"))
        .collect()
}
