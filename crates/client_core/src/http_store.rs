use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{
        Exercise, ExerciseId, NewExercise, NewSignup, SignupId, SignupStatus, TrainerSignup,
    },
    error::{ApiError, ApiException},
    machine_code,
    protocol::{
        exercises_route, signup_status_route, signups_route, ExerciseCreatedResponse,
        SignupCreatedResponse, SignupListQuery, UpdateSignupStatusRequest,
    },
};
use storage::GymStore;
use tracing::debug;
use url::Url;

/// [`GymStore`] backed by the gym guide HTTP server.
pub struct HttpGymStore {
    http: Client,
    base_url: Url,
}

impl HttpGymStore {
    pub fn new(server_url: &str) -> Result<Self> {
        let base_url = Url::parse(server_url.trim())
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("server url '{server_url}' cannot carry a path"));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, route: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("server url cannot carry a path"))?;
            segments.pop_if_empty();
            segments.extend(route.split('/').filter(|segment| !segment.is_empty()));
        }
        Ok(url)
    }

    fn exercise_url(&self, code: &str) -> Result<Url> {
        let mut url = self.endpoint(exercises_route())?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("server url cannot carry a path"))?
            .push(code);
        Ok(url)
    }

    async fn list_signups(&self, query: SignupListQuery) -> Result<Vec<TrainerSignup>> {
        let res = self
            .http
            .get(self.endpoint(signups_route())?)
            .query(&query)
            .send()
            .await?;
        Ok(ensure_success(res).await?.json().await?)
    }
}

/// Turns a non-2xx response into an error, keeping the server's
/// [`ApiError`] message when the body carries one.
async fn ensure_success(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    match res.json::<ApiError>().await {
        Ok(api_error) => Err(ApiException::from(api_error).into()),
        Err(_) => Err(anyhow!("server responded with {status}")),
    }
}

#[async_trait]
impl GymStore for HttpGymStore {
    async fn get_exercise_by_code(&self, code: &str) -> Result<Option<Exercise>> {
        let code = machine_code::canonical(code);
        if code.is_empty() {
            return Ok(None);
        }
        let res = self.http.get(self.exercise_url(&code)?).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            debug!(%code, "exercise not found on server");
            return Ok(None);
        }
        Ok(Some(ensure_success(res).await?.json().await?))
    }

    async fn insert_exercise(&self, exercise: &NewExercise) -> Result<ExerciseId> {
        let res = self
            .http
            .post(self.endpoint(exercises_route())?)
            .json(exercise)
            .send()
            .await?;
        let body: ExerciseCreatedResponse = ensure_success(res).await?.json().await?;
        Ok(body.exercise_id)
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let res = self
            .http
            .get(self.endpoint(exercises_route())?)
            .send()
            .await?;
        Ok(ensure_success(res).await?.json().await?)
    }

    async fn submit_signup(&self, signup: &NewSignup) -> Result<SignupId> {
        let res = self
            .http
            .post(self.endpoint(signups_route())?)
            .json(signup)
            .send()
            .await?;
        let body: SignupCreatedResponse = ensure_success(res).await?.json().await?;
        Ok(body.signup_id)
    }

    async fn update_signup_status(
        &self,
        signup_id: SignupId,
        status: SignupStatus,
    ) -> Result<bool> {
        let res = self
            .http
            .patch(self.endpoint(&signup_status_route(signup_id))?)
            .json(&UpdateSignupStatusRequest { status })
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        ensure_success(res).await?;
        Ok(true)
    }

    async fn list_signups_by_trainer(&self, trainer: &str) -> Result<Vec<TrainerSignup>> {
        self.list_signups(SignupListQuery {
            trainer: Some(trainer.to_string()),
            email: None,
        })
        .await
    }

    async fn list_signups_by_email(&self, email: &str) -> Result<Vec<TrainerSignup>> {
        self.list_signups(SignupListQuery {
            trainer: None,
            email: Some(email.to_string()),
        })
        .await
    }
}

#[cfg(test)]
#[path = "tests/http_store_tests.rs"]
mod tests;
