use std::path::PathBuf;
use std::sync::Mutex;

use actix_web::{test, web, App};
use serde_json::Value;

use tessera::http::server::{
    evolution, evolution_data_deprecated, evolution_dynamic, evolution_integrated,
    import_trading_machine, module_by_name, modules, technologies, technology_rows,
    trading_machines, tree_data, AppState, ImportRequest,
};
use tessera::store::baseline::{EvolutionData, ModuleData, TreeNode};
use tessera::store::cases::CaseRecord;
use tessera::store::technology::TechnologyRecord;

fn scratch_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("tessera-e2e-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

#[actix_web::test]
async fn test_that_api_round_trip_works() {
    let app_state = Mutex::new(AppState::create(scratch_path()).unwrap());
    let data = web::Data::new(app_state);

    let app = test::init_service(
        App::new()
            .app_data(data)
            .service(modules)
            .service(module_by_name)
            .service(evolution)
            .service(evolution_integrated)
            .service(evolution_dynamic)
            .service(evolution_data_deprecated)
            .service(technologies)
            .service(technology_rows)
            .service(trading_machines)
            .service(tree_data)
            .service(import_trading_machine),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/modules").to_request();
    let module_list: Vec<ModuleData> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(module_list.len(), 8);

    let req = test::TestRequest::get().uri("/api/evolution").to_request();
    let base: EvolutionData = test::call_and_read_body_json(&app, req).await;
    assert_eq!(base.modules.len(), 8);

    let req = test::TestRequest::get()
        .uri("/api/evolution/integrated")
        .to_request();
    let integrated: EvolutionData = test::call_and_read_body_json(&app, req).await;
    assert!(integrated.modules.len() >= base.modules.len());

    let req = test::TestRequest::get()
        .uri("/api/evolution/dynamic")
        .to_request();
    let dynamic: EvolutionData = test::call_and_read_body_json(&app, req).await;
    assert!(!dynamic.modules.is_empty());

    let req = test::TestRequest::get().uri("/api/technologies").to_request();
    let techs: Vec<TechnologyRecord> = test::call_and_read_body_json(&app, req).await;
    assert!(!techs.is_empty());
    // Every catalogued technology has a dynamic row.
    assert!(dynamic.modules.len() >= techs.len());

    let req = test::TestRequest::get().uri("/api/trading-machines").to_request();
    let cases: Vec<CaseRecord> = test::call_and_read_body_json(&app, req).await;
    let seeded = cases.len();
    assert!(seeded >= 2);

    let req = test::TestRequest::get().uri("/api/tree-data").to_request();
    let tree: TreeNode = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tree.name, "ML");

    // Import a case, then read it back through the list endpoint.
    let req = test::TestRequest::post()
        .uri("/api/import/trading-machine")
        .set_json(ImportRequest {
            raw_text: Some("Экспериментальная машина на ансамблях.\n\nПериод: 2024-2025\n".to_string()),
            name: Some("Ensemble Lab".to_string()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: CaseRecord = test::read_body_json(resp).await;

    let req = test::TestRequest::get().uri("/api/trading-machines").to_request();
    let cases: Vec<CaseRecord> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cases.len(), seeded + 1);
    assert!(cases.iter().any(|c| c.id == created.id));

    // The 404 contract carries a JSON error body.
    let req = test::TestRequest::get()
        .uri("/api/modules/__does_not_exist__")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("error").is_some());
}
