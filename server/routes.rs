use actix_web::{get, post, web, HttpResponse};
use chrono::{Local, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use section_control::constants::BASE_DATE;
use section_control::conflict::ConflictSummary;
use section_control::data::sample_network;
use section_control::time::parse_base_offset;
use section_control::{
    build_schedules, Conflict, ConflictResolver, OptimizationMetrics, Priority, ScheduleOptimizer,
    SectionController, TrackSection, Train, TrainType, WhatIfAnalyzer,
};

use crate::error::ApiError;

pub struct AppState {
    controller: Mutex<SectionController>,
    optimizer: ScheduleOptimizer,
    analyzer: WhatIfAnalyzer,
    resolver: ConflictResolver,
}

impl AppState {
    pub fn new(controller: SectionController, optimizer: ScheduleOptimizer) -> Self {
        Self {
            controller: Mutex::new(controller),
            optimizer,
            analyzer: WhatIfAnalyzer::new(optimizer),
            resolver: ConflictResolver::new(),
        }
    }

    fn controller(&self) -> Result<MutexGuard<'_, SectionController>, ApiError> {
        self.controller
            .lock()
            .map_err(|_| ApiError::Internal("session state is poisoned".to_string()))
    }
}

type Data = web::Data<AppState>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(list_trains)
            .service(add_train)
            .service(list_sections)
            .service(list_conflicts)
            .service(optimize)
            .service(what_if_delay)
            .service(what_if_priority)
            .service(schedule)
            .service(reset),
    );
}

#[get("/trains")]
async fn list_trains(state: Data) -> Result<HttpResponse, ApiError> {
    let controller = state.controller()?;
    Ok(HttpResponse::Ok().json(controller.active_trains()))
}

#[derive(Debug, Deserialize)]
struct NewTrain {
    train_number: String,
    train_type: TrainType,
    priority: Priority,
    route: Vec<String>,
    scheduled_arrival: NaiveDateTime,
    scheduled_departure: NaiveDateTime,
    #[serde(default)]
    current_delay_minutes: u32,
    #[serde(default)]
    estimated_section_times: HashMap<String, u32>,
}

#[post("/trains")]
async fn add_train(state: Data, body: web::Json<NewTrain>) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let mut controller = state.controller()?;

    let train = Train::new(
        controller.next_train_id(),
        body.train_number,
        body.train_type,
        body.priority,
        body.route,
        body.scheduled_arrival,
        body.scheduled_departure,
    )
    .with_section_times(body.estimated_section_times)
    .with_delay(body.current_delay_minutes);

    controller.add_train(train.clone())?;
    log::info!("Added train {} ({})", train.train_id, train.train_number);
    Ok(HttpResponse::Created().json(train))
}

#[derive(Debug, Deserialize)]
struct AtQuery {
    /// `HH:MM:SS` on the base date; defaults to the current wall-clock time
    at: Option<String>,
}

#[derive(Serialize)]
struct SectionStatus<'a> {
    #[serde(flatten)]
    section: &'a TrackSection,
    current_occupancy: Vec<&'a str>,
    utilization: f64,
}

#[get("/sections")]
async fn list_sections(state: Data, query: web::Query<AtQuery>) -> Result<HttpResponse, ApiError> {
    let at = match &query.at {
        Some(at) => parse_base_offset(at).map_err(|e| ApiError::BadRequest(format!("bad time '{at}': {e}")))?,
        None => BASE_DATE.and_time(Local::now().time()),
    };

    let controller = state.controller()?;
    let schedules = build_schedules(controller.active_trains(), controller.sections())?;

    let statuses: Vec<SectionStatus> = controller
        .sections()
        .iter()
        .zip(schedules.values())
        .map(|(section, section_schedule)| SectionStatus {
            section,
            current_occupancy: section_schedule.occupancy_at(at),
            utilization: section_schedule.utilization_at(at, section.capacity),
        })
        .collect();

    Ok(HttpResponse::Ok().json(statuses))
}

#[derive(Serialize)]
struct ConflictReport {
    conflicts: Vec<Conflict>,
    summary: ConflictSummary,
    suggestions: IndexMap<String, Vec<String>>,
}

#[get("/conflicts")]
async fn list_conflicts(state: Data) -> Result<HttpResponse, ApiError> {
    let controller = state.controller()?;
    let detector = state.optimizer.detector();
    let conflicts = detector.detect(controller.active_trains(), controller.sections())?;

    let report = ConflictReport {
        summary: detector.summarize(&conflicts),
        suggestions: state.resolver.suggest(&conflicts),
        conflicts,
    };
    Ok(HttpResponse::Ok().json(report))
}

#[derive(Serialize)]
struct OptimizeResponse {
    metrics: OptimizationMetrics,
    conflicts_remaining: usize,
}

/// Run the optimizer and adopt its train set as the new session state
#[post("/optimize")]
async fn optimize(state: Data) -> Result<HttpResponse, ApiError> {
    let mut controller = state.controller()?;
    let result = state.optimizer.optimize(controller.active_trains(), controller.sections())?;
    controller.replace_trains(result.optimized_trains)?;

    log::info!(
        "Optimization applied: {} -> {} conflicts",
        result.metrics.original_conflicts,
        result.metrics.optimized_conflicts
    );
    Ok(HttpResponse::Ok().json(OptimizeResponse {
        metrics: result.metrics,
        conflicts_remaining: result.conflicts_remaining.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct DelayScenario {
    train_id: String,
    delay_minutes: u32,
}

#[post("/what_if/delay")]
async fn what_if_delay(state: Data, body: web::Json<DelayScenario>) -> Result<HttpResponse, ApiError> {
    let controller = state.controller()?;
    let report = state.analyzer.analyze_delay(
        controller.active_trains(),
        controller.sections(),
        &body.train_id,
        body.delay_minutes,
    )?;
    Ok(HttpResponse::Ok().json(report))
}

#[derive(Debug, Deserialize)]
struct PriorityScenario {
    train_id: String,
    new_priority: Priority,
}

#[post("/what_if/priority")]
async fn what_if_priority(state: Data, body: web::Json<PriorityScenario>) -> Result<HttpResponse, ApiError> {
    let controller = state.controller()?;
    let report = state.analyzer.analyze_priority(
        controller.active_trains(),
        controller.sections(),
        &body.train_id,
        body.new_priority,
    )?;
    Ok(HttpResponse::Ok().json(report))
}

#[get("/schedule")]
async fn schedule(state: Data) -> Result<HttpResponse, ApiError> {
    let controller = state.controller()?;
    let schedules = build_schedules(controller.active_trains(), controller.sections())?;
    Ok(HttpResponse::Ok().json(schedules))
}

#[post("/reset")]
async fn reset(state: Data) -> Result<HttpResponse, ApiError> {
    let fresh = sample_network()?;
    let mut controller = state.controller()?;
    controller.reset(fresh);
    log::info!("Session reset to sample network");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "reset" })))
}
