use axum::{Json, extract::State};
use std::sync::Arc;

use super::{AppState, DocsResponse, EndpointDoc, FieldDoc, HealthResponse};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /api/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: "healthy",
        message: "FileWriter API is operational".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database,
        version: VERSION,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

const CONTENT_FIELDS: &[FieldDoc] = &[
    FieldDoc {
        name: "filename",
        required: true,
        description: "Path relative to the files root",
    },
    FieldDoc {
        name: "content",
        required: true,
        description: "Text to write; may be empty",
    },
];

const ENDPOINTS: &[EndpointDoc] = &[
    EndpointDoc {
        path: "/api/write",
        methods: &["POST"],
        auth: "bearer",
        description: "Create or overwrite a file",
        fields: CONTENT_FIELDS,
    },
    EndpointDoc {
        path: "/api/append",
        methods: &["POST"],
        auth: "bearer",
        description: "Append to a file, creating it if missing; reports file_existed",
        fields: CONTENT_FIELDS,
    },
    EndpointDoc {
        path: "/api/generate",
        methods: &["POST"],
        auth: "bearer",
        description: "Generate a module from a built-in template",
        fields: &[
            FieldDoc {
                name: "module",
                required: true,
                description: "Module name",
            },
            FieldDoc {
                name: "type",
                required: false,
                description: "Template: google_docs_handler, journal_tracker, or generic",
            },
            FieldDoc {
                name: "filename",
                required: false,
                description: "Target path; defaults to <module>.py",
            },
            FieldDoc {
                name: "overwrite",
                required: false,
                description: "Replace an existing file (default false)",
            },
        ],
    },
    EndpointDoc {
        path: "/api/list",
        methods: &["GET", "POST"],
        auth: "bearer",
        description: "List files with metadata",
        fields: &[
            FieldDoc {
                name: "directory",
                required: false,
                description: "Directory relative to the files root (default \".\")",
            },
            FieldDoc {
                name: "pattern",
                required: false,
                description: "Shell glob matched against file names",
            },
            FieldDoc {
                name: "recursive",
                required: false,
                description: "Walk subdirectories (default false)",
            },
        ],
    },
    EndpointDoc {
        path: "/api/health",
        methods: &["GET"],
        auth: "none",
        description: "Service status",
        fields: &[],
    },
    EndpointDoc {
        path: "/api/docs",
        methods: &["GET"],
        auth: "none",
        description: "This endpoint map",
        fields: &[],
    },
];

/// GET /api/docs
pub async fn api_docs() -> Json<DocsResponse> {
    Json(DocsResponse {
        name: "FileWriter API",
        version: VERSION,
        authentication: "Authorization: Bearer <API_SECRET_KEY>",
        endpoints: ENDPOINTS,
    })
}
