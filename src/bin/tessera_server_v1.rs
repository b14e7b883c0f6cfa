use std::env;
use std::sync::Mutex;

use actix_web::{web, App, HttpServer};
use tessera::http::server::{
    enrich, evolution, evolution_data_deprecated, evolution_data_dynamic_deprecated,
    evolution_data_integrated_deprecated, evolution_dynamic, evolution_integrated,
    import_trading_machine, module_by_name, modules, technologies, technology_rows,
    trading_machines, tree_data, AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let address: String = args[1].clone();
    let port: u16 = args[2].parse().unwrap();
    let imports_path = args
        .get(3)
        .cloned()
        .unwrap_or_else(|| "imported_cases.json".to_string());

    let app_state = Mutex::new(AppState::create(imports_path).unwrap());
    let matrix_state = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .app_data(matrix_state.clone())
            .service(modules)
            .service(module_by_name)
            .service(evolution)
            .service(evolution_integrated)
            .service(evolution_dynamic)
            .service(evolution_data_deprecated)
            .service(evolution_data_integrated_deprecated)
            .service(evolution_data_dynamic_deprecated)
            .service(technologies)
            .service(technology_rows)
            .service(trading_machines)
            .service(tree_data)
            .service(import_trading_machine)
            .service(enrich)
    })
    .bind((address, port))?
    .run()
    .await
}
