#![allow(dead_code)]

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use invoice_tracker::api::{ApiClient, ApiError, ApiRequest, ApiResponse, Transport};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use tracker_core::{FixedClock, MemoryPreferenceStore};
use tracker_domain::{ExpenseItem, Product};

pub const BASE_URL: &str = "http://api.test";

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh data directory for one test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Replays canned responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<ApiResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, response: ApiResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("no request was sent")
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::Network {
                message: format!("no scripted response for {}", request.url),
                connect: true,
            })
    }
}

pub fn client_with(responses: Vec<ApiResponse>) -> (ApiClient, Arc<ScriptedTransport>) {
    let transport = ScriptedTransport::new(responses);
    let client = ApiClient::new(BASE_URL, transport.clone());
    (client, transport)
}

pub fn ok(body: &str) -> ApiResponse {
    ApiResponse::new(200, body)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn fixed_clock(y: i32, m: u32, d: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock::on(date(y, m, d)))
}

pub fn memory_store(clock: Arc<FixedClock>) -> Arc<MemoryPreferenceStore> {
    Arc::new(MemoryPreferenceStore::new(clock))
}

pub fn expense(id: i64, store: &str, category: &str, date: &str, total: f64) -> ExpenseItem {
    ExpenseItem::new(id, store, total)
        .with_category(category)
        .with_date(date)
        .with_card("Visa ****1234")
        .with_order_number(format!("ORD-{:03}", id))
        .with_products(vec![Product::new(format!("{} item", store), total, 1)])
}
