//! AWS Lambda handler for running credit simulations
//!
//! Accepts a simulation configuration as JSON and returns every loan's
//! schedule, the combined table, the breakpoint table and the summary.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use credit_simulator::{
    BreakpointRow, LoanSchedules, PeriodRow, Simulation, SimulationConfig, SimulationSummary, Warning,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::Serialize;

/// Output of one simulation
#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub schedules: LoanSchedules,
    pub table: Vec<PeriodRow>,
    pub breakpoints: Vec<BreakpointRow>,
    pub summary: SimulationSummary,
    pub warnings: Vec<Warning>,
    pub execution_time_ms: u64,
}

fn response(status: i64, body: Option<String>) -> Result<LambdaFunctionUrlResponse, Error> {
    let mut response = LambdaFunctionUrlResponse {
        status_code: status,
        headers: Default::default(),
        body,
        is_base64_encoded: false,
        cookies: Vec::new(),
    };
    response.headers.insert("content-type", "application/json".parse()?);
    response.headers.insert("access-control-allow-origin", "*".parse()?);
    response.headers.insert("access-control-allow-methods", "POST, OPTIONS".parse()?);
    response.headers.insert("access-control-allow-headers", "Content-Type".parse()?);
    Ok(response)
}

fn error_response(status: i64, message: &str) -> Result<LambdaFunctionUrlResponse, Error> {
    let body = serde_json::json!({ "error": message }).to_string();
    response(status, Some(body))
}

/// Run one simulation from a JSON body: the status code and the JSON reply
fn simulate(body: &str) -> (i64, String) {
    let start = std::time::Instant::now();

    let config = match SimulationConfig::from_json_str(body) {
        Ok(config) => config,
        Err(e) => {
            warn!("rejected request: {}", e);
            return (400, serde_json::json!({ "error": format!("Invalid configuration: {}", e) }).to_string());
        }
    };

    let sim = Simulation::run(&config);
    let reply = SimulationResponse {
        schedules: sim.schedules().clone(),
        table: sim.period_table(),
        breakpoints: sim.breakpoints(),
        summary: sim.summary(),
        warnings: sim.warnings().to_vec(),
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    match serde_json::to_string(&reply) {
        Ok(json) => {
            info!("simulated {} months in {} ms", sim.axis_len(), reply.execution_time_ms);
            (200, json)
        }
        Err(e) => (500, serde_json::json!({ "error": e.to_string() }).to_string()),
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<LambdaFunctionUrlResponse, Error> {
    let request = event.payload;

    // Handle CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return response(200, None);
    }

    if request.is_base64_encoded {
        return error_response(400, "binary bodies are not supported");
    }

    let body = request.body.as_deref().unwrap_or("");
    if body.trim().is_empty() {
        return error_response(400, "empty request body");
    }

    let (status, json) = simulate(body);
    response(status, Some(json))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_valid_body() {
        let body = r#"{
            "primary": { "principal": 300000, "annual_rate_pct": 3.5, "duration_months": 240, "start": "2026-01" },
            "secondary": [ { "principal": 100000, "annual_rate_pct": 2.5, "duration_months": 120, "start": "2028-01" } ]
        }"#;
        let (status, json) = simulate(body);
        assert_eq!(status, 200);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["table"].as_array().unwrap().len(), 240);
        assert_eq!(value["breakpoints"].as_array().unwrap().len(), 3);
        assert_eq!(value["table"][0]["label"], "01/2026");
    }

    #[test]
    fn test_simulate_invalid_body() {
        let (status, json) = simulate("{ not json");
        assert_eq!(status, 400);
        assert!(json.contains("error"));
    }

    #[test]
    fn test_error_response_headers() {
        let reply = error_response(400, "bad").unwrap();
        assert_eq!(reply.status_code, 400);
        assert_eq!(reply.headers["content-type"], "application/json");
        assert_eq!(reply.body.as_deref(), Some(r#"{"error":"bad"}"#));
    }
}
