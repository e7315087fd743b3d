//! Authenticated ERP client.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Method, Response, StatusCode};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::envelope::{rows_of, ListQuery};
use crate::errors::ErpError;
use crate::models::{
    date_to_epoch_millis, CdiRateRow, DischargeRow, ExpenseRow, ParcelRow, ProcessRow, TitleRow,
};
use crate::session::{
    sid_from_set_cookie, LoginRejection, Session, LOGIN_ERROR_MAX_SESSIONS,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ErpConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Value for the `cnx-filcod` branch header (and the title filter).
    pub branch_code: String,
    /// Value for the `cnx-usncod` user header.
    pub user_code: String,
}

pub struct ErpClient {
    http: reqwest::Client,
    config: ErpConfig,
    session: Mutex<Option<Session>>,
}

impl ErpClient {
    pub fn new(config: ErpConfig) -> Result<Self, ErpError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            config,
            session: Mutex::new(None),
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Authenticates against `/login` and captures the sid cookie.
    ///
    /// When the ERP rejects the login because the account is at its session
    /// limit, the least recently used session is killed and the login is
    /// retried exactly once.
    async fn login(&self) -> Result<Session, ErpError> {
        let mut session_to_kill: Option<String> = None;

        loop {
            let mut body = json!({
                "username": self.config.username,
                "password": self.config.password,
            });
            if let Some(kill) = &session_to_kill {
                body["sessionToKill"] = Value::String(kill.clone());
            }

            let response = self
                .http
                .post(format!("{}/login", self.config.base_url))
                .json(&body)
                .send()
                .await?;

            if response.status().is_success() {
                let cookies = response
                    .headers()
                    .get_all(SET_COOKIE)
                    .iter()
                    .filter_map(|value| value.to_str().ok());
                let sid = sid_from_set_cookie(cookies).ok_or_else(|| {
                    ErpError::Auth("login response carried no sid cookie".to_string())
                })?;
                log::debug!("ERP login succeeded");
                return Ok(Session::new(sid));
            }

            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();

            if session_to_kill.is_none() {
                if let Ok(rejection) = serde_json::from_str::<LoginRejection>(&text) {
                    if rejection.kind.as_deref() == Some(LOGIN_ERROR_MAX_SESSIONS) {
                        if let Some(oldest) = rejection.oldest_session() {
                            log::info!(
                                "ERP session limit reached, killing session {}",
                                oldest.session_id
                            );
                            session_to_kill = Some(oldest.session_id.clone());
                            continue;
                        }
                    }
                }
            }

            return Err(ErpError::Auth(format!(
                "login rejected ({}): {}",
                status, text
            )));
        }
    }

    /// Current session cookie, logging in when absent or expired.
    async fn session_cookie(&self) -> Result<String, ErpError> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            if !session.is_expired() {
                return Ok(session.cookie());
            }
        }
        let session = self.login().await?;
        let cookie = session.cookie();
        *guard = Some(session);
        Ok(cookie)
    }

    /// Drops the held session and logs in again.
    async fn refresh_session(&self) -> Result<String, ErpError> {
        let mut guard = self.session.lock().await;
        let session = self.login().await?;
        let cookie = session.cookie();
        *guard = Some(session);
        Ok(cookie)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        cookie: &str,
    ) -> Result<Response, ErpError> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self
            .http
            .request(method, url)
            .header(COOKIE, cookie)
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .header("cnx-filcod", &self.config.branch_code)
            .header("cnx-usncod", &self.config.user_code)
            .header("cnx-datalanguage", "pt");
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Sends one request under the current session, refreshing the sid and
    /// replaying the request exactly once on a 401.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ErpError> {
        let cookie = self.session_cookie().await?;
        let mut response = self.send(method.clone(), path, body.as_ref(), &cookie).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            log::debug!("ERP answered 401 on {}, refreshing session", path);
            let cookie = self.refresh_session().await?;
            response = self.send(method, path, body.as_ref(), &cookie).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ErpError::Payload(format!("invalid JSON from {}: {}", path, e)))
    }

    /// Runs a list query and deserializes each row, skipping rows the ERP
    /// shaped unexpectedly (with a diagnostic) instead of failing the batch.
    fn parse_rows<T: serde::de::DeserializeOwned>(path: &str, value: Value) -> Vec<T> {
        rows_of(value)
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    log::warn!("skipping malformed row from {}: {}", path, err);
                    None
                }
            })
            .collect()
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// Process master data (`imp021`).
    pub async fn process_by_id(&self, process_id: &str) -> Result<ProcessRow, ErpError> {
        let path = format!("/imp021/{}", process_id);
        let value = self.execute(Method::GET, &path, None).await?;
        let rows: Vec<ProcessRow> = Self::parse_rows(&path, value);
        rows.into_iter().next().ok_or_else(|| {
            ErpError::Payload(format!("process {} not found in imp021", process_id))
        })
    }

    /// Daily CDI samples (`fin101`), optionally bounded to an inclusive date
    /// window, most recent first.
    pub async fn cdi_rates(
        &self,
        window: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<CdiRateRow>, ErpError> {
        let mut query = ListQuery::new("fin101.FinTaxasCDI")
            .page_size(200)
            .order_by("ftxDtaTaxa", "desc");
        if let Some((start, end)) = window {
            query = query
                .filter("ftxDtaTaxa#GE", date_to_epoch_millis(start))
                .filter("ftxDtaTaxa#LE", date_to_epoch_millis(end));
        }

        let path = "/fin101/FinTaxasCDI/list";
        let body = serde_json::to_value(&query)
            .map_err(|e| ErpError::Payload(e.to_string()))?;
        let value = self.execute(Method::POST, path, Some(body)).await?;
        Ok(Self::parse_rows(path, value))
    }

    /// Scheduled payment parcels for a process (`log009`).
    pub async fn parcels(&self, process_id: &str) -> Result<Vec<ParcelRow>, ErpError> {
        let path = format!("/log009/parcelas/list?imcCod={}", process_id);
        let value = self.execute(Method::GET, &path, None).await?;
        Ok(Self::parse_rows(&path, value))
    }

    /// Expense rows booked against a process (`imp021`).
    pub async fn process_expenses(&self, process_id: &str) -> Result<Vec<ExpenseRow>, ErpError> {
        let query = ListQuery::new("imp021.ImpProcessoDespesas")
            .filter("pidVldStatus#EQ", "1")
            .order_by("prjCod", "asc");

        let path = format!("/imp021/DespesasProcesso/{}", process_id);
        let body = serde_json::to_value(&query)
            .map_err(|e| ErpError::Payload(e.to_string()))?;
        let value = self.execute(Method::POST, &path, Some(body)).await?;
        Ok(Self::parse_rows(&path, value))
    }

    /// Open financial titles for a process (`psq015`).
    pub async fn financial_titles(&self, process_code: i64) -> Result<Vec<TitleRow>, ErpError> {
        let branch: i64 = self.config.branch_code.parse().unwrap_or(2);
        let query = ListQuery::new("psq015")
            .page_size(20)
            .filter("fExibirRenegociados#EQ", "0")
            .filter("fExibirAgrupados#EQ", "0")
            .filter("fPriCod#EQ", process_code)
            .filter("vldSituacao#IN", json!(["1"]))
            .filter("docVldPrevisao#EQ", "0")
            .filter("filCod#IN", json!([branch]))
            .order_by("filCod", "asc");

        let path = "/psq015/list";
        let body = serde_json::to_value(&query)
            .map_err(|e| ErpError::Payload(e.to_string()))?;
        let value = self.execute(Method::POST, path, Some(body)).await?;
        Ok(Self::parse_rows(path, value))
    }

    /// Discharge events for one title (`psq015/{fil}/{tip}/{doc}/{tit}`).
    ///
    /// The ERP answers 404/500 when a title simply has no discharge data;
    /// both normalize to an empty list. Single-object responses become a
    /// one-element list.
    pub async fn title_discharges(
        &self,
        company_code: i64,
        document_type: i64,
        document_code: i64,
        title_code: i64,
    ) -> Result<Vec<DischargeRow>, ErpError> {
        let path = format!(
            "/psq015/{}/{}/{}/{}",
            company_code, document_type, document_code, title_code
        );

        match self.execute(Method::GET, &path, None).await {
            Ok(value) => Ok(Self::parse_rows(&path, value)),
            Err(ErpError::Status { status: 404, .. }) | Err(ErpError::Status { status: 500, .. }) => {
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Books the financing-charge expense (`imp021/ProcessoDespesas`).
    ///
    /// `amount` is in the process currency; the booked value is converted to
    /// BRL with the fiscal rate and rounded to cents.
    pub async fn submit_expense(
        &self,
        process_id: &str,
        amount: Decimal,
        fiscal_rate: Decimal,
        emission_date: NaiveDate,
    ) -> Result<(), ErpError> {
        let effective_rate = if fiscal_rate > Decimal::ZERO {
            fiscal_rate
        } else {
            Decimal::ONE
        };
        let value_brl = (amount * effective_rate).round_dp(2);

        let body = json!({
            "moeCod": 790,
            "gerVldFeatureCliente": 0,
            "priCod": process_id,
            "priVldTipo": 3,
            "frontModelName": "despesasProcesso",
            "prjCod": 1,
            "idtCod": 1,
            "pidVldStatus": 1,
            "impCod": 1081,
            "pidVldFormaReteio": 2,
            "pidDtaTaxas": date_to_epoch_millis(emission_date),
            "pdiVldOrigemDesp": 1,
            "pidVldTipo": 1,
            "pidVldLibera": 1,
            "pidVldNfserv": 0,
            "pidVldFonte": 1,
            "impDesNome": "ENCARGOS FINANCEIROS",
            "moeEspNome": "REAL/BRASIL",
            "pidFltTxMneg": 1,
            "ctpDesNome": "ENCARGOS FINANCEIROS",
            "ctpCod": 672,
            "prdDesNome": null,
            "prdCod": null,
            "pidMnyValormn": value_brl,
            "pidMnyValorMneg": value_brl,
            "filCod": self.config.branch_code,
        });

        self.execute(Method::POST, "/imp021/ProcessoDespesas", Some(body))
            .await?;
        log::info!(
            "financing charge of {} BRL booked on process {}",
            value_brl,
            process_id
        );
        Ok(())
    }
}
