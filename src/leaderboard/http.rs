//! Score API over browser `fetch`

use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{LeaderboardError, Rankings, ScoreEntry, ScoreService, validate_nickname};

#[derive(Debug, Clone)]
pub struct HttpScoreService {
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreBody<'a> {
    game_name: &'a str,
    nickname: &'a str,
    score: u64,
}

impl HttpScoreService {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request and return the response body as text
    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<String>,
    ) -> Result<String, LeaderboardError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
        }

        let window = web_sys::window()
            .ok_or_else(|| LeaderboardError::Network("no window".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;

        if !response.ok() {
            return Err(LeaderboardError::Status(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        Ok(text.as_string().unwrap_or_default())
    }
}

fn js_error(value: JsValue) -> LeaderboardError {
    LeaderboardError::Network(format!("{:?}", value))
}

impl ScoreService for HttpScoreService {
    async fn fetch_all(&self) -> Result<Rankings, LeaderboardError> {
        let text = self.send("GET", &self.url("scores"), None).await?;
        let rankings = Rankings::from_json(&text)?;
        log::info!("Fetched rankings");
        Ok(rankings)
    }

    async fn delete_score(&self, id: &str) -> Result<(), LeaderboardError> {
        match self.send("DELETE", &self.url(&format!("scores/{}", id)), None).await {
            Err(LeaderboardError::Status(404)) => Err(LeaderboardError::NotFound(id.to_string())),
            other => other.map(|_| ()),
        }
    }

    async fn update_nickname(
        &self,
        entry: &ScoreEntry,
        nickname: &str,
    ) -> Result<(), LeaderboardError> {
        let nickname = validate_nickname(nickname)?;
        let body = serde_json::to_string(&ScoreBody {
            game_name: &entry.game_name,
            nickname: &nickname,
            score: entry.score,
        })?;
        let url = self.url(&format!("scores/{}", entry.id));
        match self.send("PUT", &url, Some(body)).await {
            Err(LeaderboardError::Status(404)) => Err(LeaderboardError::NotFound(entry.id.clone())),
            other => other.map(|_| ()),
        }
    }

    async fn save_score(
        &self,
        game: &str,
        nickname: &str,
        score: u64,
    ) -> Result<(), LeaderboardError> {
        let body = serde_json::to_string(&ScoreBody {
            game_name: game,
            nickname,
            score,
        })?;
        self.send("POST", &self.url("scores"), Some(body)).await?;
        Ok(())
    }
}
