use std::sync::Arc;

use goose::{
    config::{GooseConfiguration, GooseDefault, GooseDefaultType as _},
    goose::{
        GooseMethod, GooseRequest, GooseUser, Scenario, Transaction, TransactionError,
        TransactionFunction, TransactionResult,
    },
    metrics::GooseMetrics,
    GooseAttack, GooseError,
};

use crate::{
    prelude::*,
    sales::{self, RequestKind, SaleRequest, Workload},
};

mod config;

pub use self::config::{LoadConfig, StopCondition};


/// Runs the load test: `load.users` goose users repeatedly create sales
/// according to `workload`. Goose prints its metrics report when done.
pub async fn run(config: &LoadConfig, workload: Workload) -> Result<GooseMetrics> {
    info!(
        users = config.users,
        stop = ?config.stop_condition(),
        "Starting load test against {}",
        workload.endpoint().collection_url(),
    );
    let metrics = attack(config, workload)?.execute().await.map_err(goose_error)?;
    info!("Load test finished");

    Ok(metrics)
}

/// Sets up the goose attack without starting it.
fn attack(config: &LoadConfig, workload: Workload) -> Result<Box<GooseAttack>> {
    let host = workload.endpoint().base().as_str().to_owned();
    let scenario = Scenario::new("Sales")
        .register_transaction(create_sale_transaction(Arc::new(workload)));

    // Command line arguments are ours, so goose must not parse them. Metrics
    // are kept from the first request on, including the ramp-up.
    let attack = GooseAttack::initialize_with_config(GooseConfiguration::default())
        .map_err(goose_error)?
        .register_scenario(scenario)
        .set_default(GooseDefault::Host, host.as_str())
        .map_err(goose_error)?
        .set_default(GooseDefault::Users, config.users)
        .map_err(goose_error)?
        .set_default(GooseDefault::HatchRate, config.hatch_rate.as_str())
        .map_err(goose_error)?
        .set_default(GooseDefault::NoResetMetrics, true)
        .map_err(goose_error)?;

    // Goose refuses a run time combined with an iteration limit.
    let attack = match config.stop_condition() {
        StopCondition::Iterations(n) => attack.set_default(GooseDefault::Iterations, n),
        StopCondition::RunTime(secs) => attack.set_default(GooseDefault::RunTime, secs),
        StopCondition::Never => Ok(attack),
    };

    attack.map_err(goose_error)
}

fn goose_error(e: GooseError) -> Error {
    anyhow!("load test failed: {e}")
}

fn create_sale_transaction(workload: Arc<Workload>) -> Transaction {
    let closure: TransactionFunction = Arc::new(move |user| {
        let workload = Arc::clone(&workload);
        Box::pin(async move { create_sale(user, &workload).await })
    });

    Transaction::new(closure).set_name("create sale")
}

/// One invocation as a goose transaction. Transport errors are handed to
/// goose, which records the request as failed. Non-2xx statuses are marked as
/// failed by goose itself.
async fn create_sale(user: &mut GooseUser, workload: &Workload) -> TransactionResult {
    let body = send(user, &workload.create_request()).await?;
    if let Some(read) = workload.read_back_request(&body) {
        send(user, &read).await?;
    }

    Ok(())
}

/// Sends `request` and returns the response body after logging it.
async fn send(
    user: &mut GooseUser,
    request: &SaleRequest,
) -> Result<String, Box<TransactionError>> {
    let method = match request.kind {
        RequestKind::Create => GooseMethod::Post,
        RequestKind::Read => GooseMethod::Get,
    };

    // Absolute URLs are used as they are, so goose does not touch the path.
    let mut request_builder = user.get_request_builder(&method, &request.url)?;
    if let Some(body) = &request.body {
        request_builder = request_builder
            .header(http::header::CONTENT_TYPE, SaleRequest::CONTENT_TYPE)
            .body(body.clone());
    }

    let goose_request = GooseRequest::builder()
        .set_request_builder(request_builder)
        .method(method)
        .name(request.name())
        .build();
    let goose = user.request(goose_request).await?;

    let response = goose.response?;
    let status = response.status();
    let body = response.text().await?;
    sales::log_response(status.as_u16(), &body);

    Ok(body)
}
