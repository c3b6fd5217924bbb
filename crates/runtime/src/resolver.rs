//! Response resolution: decide between the remote generation API and the
//! local template path, personalize the outcome, and account for remote
//! usage.
//!
//! The resolver is constructed once with its collaborators injected; it
//! owns no state beyond the cached system instruction and an advisory
//! request counter.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use istpbot_config::GenderPreference;
use istpbot_knowledge::{Category, categorize};
use istpbot_llm::{LlmError, RemoteResponder};

use crate::personalize::personalize;
use crate::templates;

/// User-facing wording per error kind (spoken by the bot, logged in full).
const ERROR_GENERIC: &str = "죄송합니다. 일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";
const ERROR_NETWORK: &str = "네트워크 연결을 확인한 후 다시 시도해주세요.";
const ERROR_API_LIMIT: &str = "API 사용량이 초과되었습니다. 잠시 후 다시 시도해주세요.";

/// Select the message shown to the user for a resolution failure.
/// Detail stays in the logs.
pub fn user_facing_message(error: &LlmError) -> &'static str {
    match error {
        LlmError::Network(_) => ERROR_NETWORK,
        LlmError::RateLimited => ERROR_API_LIMIT,
        LlmError::CredentialMissing
        | LlmError::MalformedResponse(_)
        | LlmError::Unknown { .. } => ERROR_GENERIC,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    Remote,
    LocalTemplate,
}

/// One resolved turn.  Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseResult {
    pub text: String,
    pub source: ResponseSource,
    pub category: Category,
    pub personalized: bool,
    /// Lifetime count of successful remote calls; meaningful only when
    /// `source` is `Remote`.
    pub request_count: u64,
}

pub struct ResponseResolver {
    remote: Option<Arc<dyn RemoteResponder>>,
    force_mock: bool,
    think_delay_ms: RangeInclusive<u64>,
    system_instruction: String,
    request_count: AtomicU64,
}

impl ResponseResolver {
    /// `remote` is `None` when no responder is configured at all;
    /// `think_delay_ms` bounds the simulated thinking pause on the local
    /// path (swapped into order if reversed).
    pub fn new(
        remote: Option<Arc<dyn RemoteResponder>>,
        force_mock: bool,
        think_delay_ms: RangeInclusive<u64>,
    ) -> Self {
        let (min, max) = (*think_delay_ms.start(), *think_delay_ms.end());
        let think_delay_ms = if min <= max { min..=max } else { max..=min };
        Self {
            remote,
            force_mock,
            think_delay_ms,
            system_instruction: build_system_instruction(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Successful remote calls so far.  Advisory, for observability only.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Resolve one user turn.
    ///
    /// Remote first when a responder is configured and mock mode is off;
    /// recoverable remote failures (missing credential, transport, rate
    /// limit) fall back to the local template path.  Anything else
    /// propagates.
    pub async fn resolve(
        &self,
        input: &str,
        preference: GenderPreference,
    ) -> Result<ResponseResult, LlmError> {
        let category = categorize(input);
        debug!(category = category.as_str(), input_len = input.len(), "categorized question");

        if let Some(remote) = self.remote.as_ref().filter(|_| !self.force_mock) {
            let prompt = format!("{}\n\n사용자 질문: \"{input}\"", self.system_instruction);
            match remote.generate(&prompt).await {
                Ok(text) => {
                    let count = self.request_count.fetch_add(1, Ordering::Relaxed) + 1;
                    info!(request_count = count, "remote response generated");
                    return Ok(ResponseResult {
                        text: personalize(&text, preference),
                        source: ResponseSource::Remote,
                        category,
                        personalized: preference.is_personalizing(),
                        request_count: count,
                    });
                }
                Err(err) if err.is_recoverable() => {
                    warn!(error = %err, "remote path failed, falling back to local template");
                }
                Err(err) => return Err(err),
            }
        }

        self.resolve_local(input, category, preference).await
    }

    async fn resolve_local(
        &self,
        input: &str,
        category: Category,
        preference: GenderPreference,
    ) -> Result<ResponseResult, LlmError> {
        // Simulated thinking time.  Dropping the future cancels the wait.
        let delay = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.think_delay_ms.clone())
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let text = templates::local_response(category, input);
        info!(category = category.as_str(), "local template response generated");
        Ok(ResponseResult {
            text: personalize(&text, preference),
            source: ResponseSource::LocalTemplate,
            category,
            personalized: preference.is_personalizing(),
            request_count: self.request_count(),
        })
    }
}

/// The fixed expert persona sent ahead of every remote question.
fn build_system_instruction() -> String {
    "당신은 MBTI ISTP(논리적 실용주의자) 유형 전문가입니다.\n\n\
**역할과 성격:**\n\
- ISTP에 대한 깊이 있는 지식을 가진 전문 상담사\n\
- 친근하고 이해하기 쉽게 설명하는 스타일\n\
- 실용적이고 구체적인 조언 제공\n\
- 이론보다는 실제 적용 가능한 정보 중심\n\n\
**ISTP 핵심 정보:**\n\
- 인지기능: Ti(주기능) → Se(보조) → Ni(3차) → Fe(열등기능)\n\
- 별명: 논리적 실용주의자, 만능 수리공, 기계공, 장인\n\
- 주요 특징: 논리적 분석, 실용적 문제해결, 뛰어난 손재주, 독립성\n\n\
**응답 가이드라인:**\n\
1. 한국어로 자연스럽게 응답\n\
2. 이모지 적절히 사용 (과하지 않게)\n\
3. 구체적인 예시와 실용적 조언 포함\n\
4. ISTP의 Ti-Se 특성을 반영한 논리적이고 실용적인 설명\n\
5. 400-800자 내외의 적절한 길이\n\
6. 질문 의도를 파악하여 맞춤형 답변 제공\n\n\
**금지사항:**\n\
- 의학적 진단이나 치료 조언 제공 금지\n\
- 타 MBTI 유형 비하 금지\n\
- 과도하게 학술적이거나 어려운 용어 사용 금지\n\
- 개인정보 수집 시도 금지\n\n\
다음 사용자의 질문에 ISTP 전문가로서 친근하고 도움이 되는 답변을 해주세요:"
        .to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
