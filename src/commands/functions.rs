//! Remote Function Commands
//!
//! `generate-embedding`, `generate-subtasks` and `smart-search`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use task_store::{
    BackendError, SearchResult, FN_GENERATE_EMBEDDING, FN_GENERATE_SUBTASKS, FN_SMART_SEARCH,
};

use super::{client, decode, encode, settle};

#[derive(Serialize)]
struct InvokeOptions<B> {
    body: B,
}

#[derive(Serialize)]
struct EmbeddingArgs<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SubtasksArgs<'a> {
    #[serde(rename = "taskTitle")]
    task_title: &'a str,
}

#[derive(Serialize)]
struct SearchArgs<'a> {
    query: &'a str,
    #[serde(rename = "userId")]
    user_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

#[derive(Deserialize)]
struct SubtasksResponse {
    #[serde(default)]
    subtasks: Vec<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

async fn invoke_function<B: Serialize, R: DeserializeOwned>(name: &str, body: B) -> Result<R, BackendError> {
    let options = encode(&InvokeOptions { body })?;
    let data = settle(&client()?.functions().invoke(name, &options)).await?;
    decode(data)
}

pub async fn generate_embedding(text: &str) -> Result<Option<Vec<f32>>, BackendError> {
    let response: EmbeddingResponse = invoke_function(FN_GENERATE_EMBEDDING, EmbeddingArgs { text }).await?;
    Ok(response.embedding)
}

pub async fn generate_subtasks(task_title: &str) -> Result<Vec<String>, BackendError> {
    let response: SubtasksResponse = invoke_function(FN_GENERATE_SUBTASKS, SubtasksArgs { task_title }).await?;
    Ok(response.subtasks)
}

pub async fn smart_search(query: &str, user_id: Option<&str>) -> Result<Vec<SearchResult>, BackendError> {
    let response: SearchResponse = invoke_function(FN_SMART_SEARCH, SearchArgs { query, user_id }).await?;
    Ok(response.results)
}
