pub mod client {

    use reqwest::Result;

    use super::server::{EnrichResponse, ImportRequest};
    use crate::rows::TechnologyRow;
    use crate::store::baseline::{EvolutionData, ModuleData, TreeNode};
    use crate::store::cases::CaseRecord;
    use crate::store::technology::TechnologyRecord;

    pub struct Client {
        pub path: String,
        pub client: reqwest::Client,
    }

    impl Client {
        pub async fn modules(&self) -> Result<Vec<ModuleData>> {
            self.client
                .get(self.path.clone() + "/api/modules")
                .send()
                .await?
                .json::<Vec<ModuleData>>()
                .await
        }

        pub async fn module(&self, name: &str) -> Result<ModuleData> {
            self.client
                .get(self.path.clone() + format!("/api/modules/{name}").as_str())
                .send()
                .await?
                .json::<ModuleData>()
                .await
        }

        pub async fn evolution(&self) -> Result<EvolutionData> {
            self.client
                .get(self.path.clone() + "/api/evolution")
                .send()
                .await?
                .json::<EvolutionData>()
                .await
        }

        pub async fn evolution_integrated(&self) -> Result<EvolutionData> {
            self.client
                .get(self.path.clone() + "/api/evolution/integrated")
                .send()
                .await?
                .json::<EvolutionData>()
                .await
        }

        pub async fn evolution_dynamic(&self) -> Result<EvolutionData> {
            self.client
                .get(self.path.clone() + "/api/evolution/dynamic")
                .send()
                .await?
                .json::<EvolutionData>()
                .await
        }

        pub async fn technologies(&self) -> Result<Vec<TechnologyRecord>> {
            self.client
                .get(self.path.clone() + "/api/technologies")
                .send()
                .await?
                .json::<Vec<TechnologyRecord>>()
                .await
        }

        pub async fn technology_rows(&self, module: Option<&str>) -> Result<Vec<TechnologyRow>> {
            let mut request = self.client.get(self.path.clone() + "/api/technology-rows");
            if let Some(module) = module {
                request = request.query(&[("module", module)]);
            }
            request.send().await?.json::<Vec<TechnologyRow>>().await
        }

        pub async fn trading_machines(&self) -> Result<Vec<CaseRecord>> {
            self.client
                .get(self.path.clone() + "/api/trading-machines")
                .send()
                .await?
                .json::<Vec<CaseRecord>>()
                .await
        }

        pub async fn tree_data(&self) -> Result<TreeNode> {
            self.client
                .get(self.path.clone() + "/api/tree-data")
                .send()
                .await?
                .json::<TreeNode>()
                .await
        }

        pub async fn import_trading_machine(
            &self,
            raw_text: &str,
            name: Option<&str>,
        ) -> Result<CaseRecord> {
            let req = ImportRequest {
                raw_text: Some(raw_text.to_string()),
                name: name.map(str::to_string),
            };
            self.client
                .post(self.path.clone() + "/api/import/trading-machine")
                .json(&req)
                .send()
                .await?
                .json::<CaseRecord>()
                .await
        }

        pub async fn enrich(&self, name: &str) -> Result<EnrichResponse> {
            self.client
                .get(self.path.clone() + format!("/api/enrich/{name}").as_str())
                .send()
                .await?
                .json::<EnrichResponse>()
                .await
        }

        pub fn new(path: String) -> Self {
            Self {
                path,
                client: reqwest::Client::new(),
            }
        }
    }
}

pub mod server {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use actix_web::http::StatusCode;
    use actix_web::{get, post, web, HttpResponse, ResponseError};
    use derive_more::{Display, Error};
    use log::{error, info, warn};
    use serde::{Deserialize, Serialize};

    use crate::import::{case_from_raw_text, validate_case};
    use crate::matrix::{dynamic_matrix, integrated_matrix};
    use crate::rows::{build_rows, TechnologyRow};
    use crate::source::{enrichment_from_record, fetch_technology_summary, Enrichment};
    use crate::store::baseline::{tree, EvolutionData, ModuleData, TreeNode};
    use crate::store::cases::{CaseFileError, CaseRecord, CaseStore};
    use crate::store::technology::{TechnologyRecord, TechnologyStore};

    pub type MatrixState = Mutex<AppState>;

    pub struct AppState {
        pub technologies: TechnologyStore,
        pub cases: CaseStore,
        pub baseline: Vec<ModuleData>,
        pub tree: TreeNode,
    }

    impl AppState {
        pub fn create(imports_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
            let technology_store = TechnologyStore::seed()?;
            let cases = CaseStore::seed(imports_path)?;
            let baseline = crate::matrix::baseline_matrix();
            let tree = tree()?;
            info!(
                "store loaded: {} matrix modules, {} technologies, {} seed cases, imports at {}",
                baseline.len(),
                technology_store.len(),
                cases.seed_records().len(),
                cases.imports_path().display()
            );
            Ok(Self {
                technologies: technology_store,
                cases,
                baseline,
                tree,
            })
        }
    }

    #[derive(Debug, Display, Error)]
    pub enum ApiError {
        #[display(fmt = "module not found")]
        UnknownModule,
        #[display(fmt = "invalid import payload: {}", _0)]
        InvalidImport(#[error(not(source))] String),
        #[display(fmt = "{}", _0)]
        InvalidCaseFile(#[error(not(source))] String),
        #[display(fmt = "internal error")]
        Internal,
    }

    impl From<CaseFileError> for ApiError {
        fn from(value: CaseFileError) -> Self {
            match value {
                CaseFileError::Schema(msg) => ApiError::InvalidCaseFile(msg),
                CaseFileError::Io(msg) => {
                    // Client gets the generic message, the detail stays here.
                    error!("imported case file unavailable: {msg}");
                    ApiError::Internal
                }
            }
        }
    }

    #[derive(Debug, Serialize)]
    struct ErrorBody {
        error: String,
    }

    impl ResponseError for ApiError {
        fn status_code(&self) -> StatusCode {
            match self {
                ApiError::UnknownModule => StatusCode::NOT_FOUND,
                ApiError::InvalidImport(_) => StatusCode::BAD_REQUEST,
                ApiError::InvalidCaseFile(_) => StatusCode::BAD_REQUEST,
                ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }

        fn error_response(&self) -> HttpResponse {
            HttpResponse::build(self.status_code()).json(ErrorBody {
                error: self.to_string(),
            })
        }
    }

    fn warn_deprecated(old: &str, new: &str) {
        let production = std::env::var("APP_ENV").map(|v| v == "production").unwrap_or(false);
        if !production {
            warn!("deprecated path {old}, use {new}");
        }
    }

    fn assemble_integrated(state: &AppState) -> Result<EvolutionData, ApiError> {
        let cases = state.cases.all()?;
        Ok(EvolutionData {
            modules: integrated_matrix(&state.technologies, &cases),
        })
    }

    fn assemble_dynamic(state: &AppState) -> Result<EvolutionData, ApiError> {
        let cases = state.cases.all()?;
        Ok(EvolutionData {
            modules: dynamic_matrix(&state.technologies, &cases),
        })
    }

    #[get("/api/modules")]
    pub async fn modules(
        app: web::Data<MatrixState>,
    ) -> Result<web::Json<Vec<ModuleData>>, ApiError> {
        let state = app.lock().unwrap();
        Ok(web::Json(state.baseline.clone()))
    }

    #[get("/api/modules/{name}")]
    pub async fn module_by_name(
        app: web::Data<MatrixState>,
        path: web::Path<(String,)>,
    ) -> Result<web::Json<ModuleData>, ApiError> {
        let state = app.lock().unwrap();
        let (name,) = path.into_inner();
        state
            .baseline
            .iter()
            .find(|m| m.name == name)
            .cloned()
            .map(web::Json)
            .ok_or(ApiError::UnknownModule)
    }

    #[get("/api/evolution")]
    pub async fn evolution(
        app: web::Data<MatrixState>,
    ) -> Result<web::Json<EvolutionData>, ApiError> {
        let state = app.lock().unwrap();
        Ok(web::Json(EvolutionData {
            modules: state.baseline.clone(),
        }))
    }

    #[get("/api/evolution/integrated")]
    pub async fn evolution_integrated(
        app: web::Data<MatrixState>,
    ) -> Result<web::Json<EvolutionData>, ApiError> {
        let state = app.lock().unwrap();
        Ok(web::Json(assemble_integrated(&state)?))
    }

    #[get("/api/evolution/dynamic")]
    pub async fn evolution_dynamic(
        app: web::Data<MatrixState>,
    ) -> Result<web::Json<EvolutionData>, ApiError> {
        let state = app.lock().unwrap();
        Ok(web::Json(assemble_dynamic(&state)?))
    }

    // Pre-rename paths kept for old clients. Identical behavior, one warning
    // line outside production.
    #[get("/api/evolution-data")]
    pub async fn evolution_data_deprecated(
        app: web::Data<MatrixState>,
    ) -> Result<web::Json<EvolutionData>, ApiError> {
        warn_deprecated("/api/evolution-data", "/api/evolution");
        let state = app.lock().unwrap();
        Ok(web::Json(EvolutionData {
            modules: state.baseline.clone(),
        }))
    }

    #[get("/api/evolution-data/integrated")]
    pub async fn evolution_data_integrated_deprecated(
        app: web::Data<MatrixState>,
    ) -> Result<web::Json<EvolutionData>, ApiError> {
        warn_deprecated("/api/evolution-data/integrated", "/api/evolution/integrated");
        let state = app.lock().unwrap();
        Ok(web::Json(assemble_integrated(&state)?))
    }

    #[get("/api/evolution-data/dynamic")]
    pub async fn evolution_data_dynamic_deprecated(
        app: web::Data<MatrixState>,
    ) -> Result<web::Json<EvolutionData>, ApiError> {
        warn_deprecated("/api/evolution-data/dynamic", "/api/evolution/dynamic");
        let state = app.lock().unwrap();
        Ok(web::Json(assemble_dynamic(&state)?))
    }

    #[get("/api/technologies")]
    pub async fn technologies(
        app: web::Data<MatrixState>,
    ) -> Result<web::Json<Vec<TechnologyRecord>>, ApiError> {
        let state = app.lock().unwrap();
        Ok(web::Json(state.technologies.all().to_vec()))
    }

    #[derive(Debug, Deserialize)]
    pub struct RowsQuery {
        pub module: Option<String>,
    }

    #[get("/api/technology-rows")]
    pub async fn technology_rows(
        app: web::Data<MatrixState>,
        query: web::Query<RowsQuery>,
    ) -> Result<web::Json<Vec<TechnologyRow>>, ApiError> {
        let state = app.lock().unwrap();
        Ok(web::Json(build_rows(
            &state.technologies,
            query.module.as_deref(),
        )))
    }

    #[get("/api/trading-machines")]
    pub async fn trading_machines(
        app: web::Data<MatrixState>,
    ) -> Result<web::Json<Vec<CaseRecord>>, ApiError> {
        let state = app.lock().unwrap();
        Ok(web::Json(state.cases.all()?))
    }

    #[get("/api/tree-data")]
    pub async fn tree_data(app: web::Data<MatrixState>) -> Result<web::Json<TreeNode>, ApiError> {
        let state = app.lock().unwrap();
        Ok(web::Json(state.tree.clone()))
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ImportRequest {
        #[serde(default)]
        pub raw_text: Option<String>,
        #[serde(default)]
        pub name: Option<String>,
    }

    #[post("/api/import/trading-machine")]
    pub async fn import_trading_machine(
        app: web::Data<MatrixState>,
        body: web::Json<ImportRequest>,
    ) -> Result<HttpResponse, ApiError> {
        let raw_text = body
            .raw_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidImport("rawText is required".to_string()))?;

        let case = case_from_raw_text(raw_text, body.name.as_deref());
        validate_case(&case).map_err(ApiError::InvalidImport)?;

        let state = app.lock().unwrap();
        let stored = state.cases.append_import(case)?;
        Ok(HttpResponse::Created().json(stored))
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct EnrichResponse {
        pub enrichment: Option<Enrichment>,
    }

    #[get("/api/enrich/{name}")]
    pub async fn enrich(
        app: web::Data<MatrixState>,
        path: web::Path<(String,)>,
    ) -> Result<web::Json<EnrichResponse>, ApiError> {
        let (name,) = path.into_inner();

        // Catalog hits answer locally; the lock must not be held across the
        // network await.
        let known = {
            let state = app.lock().unwrap();
            let needle = name.to_lowercase();
            state
                .technologies
                .all()
                .iter()
                .find(|t| t.name.to_lowercase() == needle)
                .map(enrichment_from_record)
        };

        let enrichment = match known {
            Some(enrichment) => Some(enrichment),
            None => fetch_technology_summary(&name).await,
        };
        Ok(web::Json(EnrichResponse { enrichment }))
    }
}
