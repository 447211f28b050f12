//! Price suggestions for catalogue products.
//!
//! Two prices are produced side by side: a fixed rule over current price,
//! rating and popularity, and a model's answer to a pricing prompt. The model
//! price is best-effort; when generation fails or the answer holds no number
//! the suggestion still carries the rule price.

use coursekit_types::{
    Completion, GenerateError, GenerateRequest, Generator, LinePolicy, StreamCallbacks,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cleaner::clean_response;
use crate::client::{Ollama, StreamOptions};

/// Popularity score used when none is known for the product.
pub const DEFAULT_POPULARITY: u64 = 10_000;

/// Input to a price suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuery {
    /// Product name (a course, or a destination for travel products).
    pub product_name: String,
    /// Current listed price, in yuan.
    pub current_price: f64,
    /// Average user rating.
    pub rating: f64,
    /// Popularity score. `None` means [`DEFAULT_POPULARITY`].
    #[serde(default)]
    pub popularity: Option<u64>,
}

impl PriceQuery {
    fn popularity(&self) -> u64 {
        self.popularity.unwrap_or(DEFAULT_POPULARITY)
    }
}

/// Rule price and model price for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    /// Price from [`rule_based_price`].
    pub rule_price: f64,
    /// First number in the model's cleaned answer, if any.
    pub ai_price: Option<f64>,
    /// Popularity score used for the rule price.
    pub popularity: u64,
    /// The model's cleaned answer. Empty if generation failed.
    pub ai_response: String,
}

/// `current_price * 0.5 + popularity * 0.0001 + rating * 100`, rounded to cents.
pub fn rule_based_price(current_price: f64, rating: f64, popularity: u64) -> f64 {
    round_cents(current_price * 0.5 + popularity as f64 * 0.0001 + rating * 100.0)
}

/// The pricing prompt sent to the model. Asks for a bare number in yuan.
pub fn price_prompt(query: &PriceQuery) -> String {
    format!(
        "请根据以下信息为旅游产品智能定价：城市：{}，当前价格：{}，用户评分：{}。只返回一个数字，单位元。",
        query.product_name, query.current_price, query.rating
    )
}

/// First decimal number in `text`, rounded to cents.
///
/// Any Unicode decimal digit counts, so full-width `３００` reads as 300.
pub fn extract_price(text: &str) -> Option<f64> {
    let number = Regex::new(r"\d+\.?\d*").expect("valid regex");
    let found = number.find(text)?;
    let ascii: String = found
        .as_str()
        .chars()
        .map(|c| ascii_digit(c, &number))
        .collect();
    ascii.parse::<f64>().ok().map(round_cents)
}

/// ASCII form of a `\d` character; anything else passes through.
///
/// Decimal digits are encoded in contiguous runs of ten starting at zero, so
/// the value is the distance from the start of the run, modulo ten.
fn ascii_digit(c: char, digit: &Regex) -> char {
    if c.is_ascii() {
        return c;
    }
    let is_digit = |c: char| digit.is_match(c.encode_utf8(&mut [0; 4]));
    if !is_digit(c) {
        return c;
    }
    let mut offset = 0u32;
    let mut code = u32::from(c);
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_digit(prev) {
            break;
        }
        offset += 1;
        code -= 1;
    }
    char::from_digit(offset % 10, 10).unwrap_or(c)
}

/// Suggest a price with a single-shot generation.
///
/// Generation errors are logged and degrade to `ai_price: None`.
pub async fn suggest_price<G: Generator>(generator: &G, query: &PriceQuery) -> PriceSuggestion {
    let popularity = query.popularity();
    let rule_price = rule_based_price(query.current_price, query.rating, popularity);

    let ai_response = match generator.generate(GenerateRequest::new(price_prompt(query))).await {
        Ok(completion) => completion.text,
        Err(err) => {
            tracing::warn!(error = %err, product = %query.product_name, "model price suggestion failed");
            String::new()
        }
    };

    PriceSuggestion {
        rule_price,
        ai_price: extract_price(&ai_response),
        popularity,
        ai_response,
    }
}

impl Ollama {
    /// Suggest a price with a single-shot generation. See [`suggest_price`].
    pub async fn suggest_price(&self, query: &PriceQuery) -> PriceSuggestion {
        suggest_price(self, query).await
    }

    /// Stream the model's pricing answer, then build the suggestion from it.
    ///
    /// The pricing stream keeps non-JSON lines verbatim, whatever policy
    /// `options` carries. `callbacks` see the raw accumulated text; the
    /// returned suggestion holds the cleaned answer. Unlike
    /// [`suggest_price`](Self::suggest_price), a failed stream is an error.
    pub async fn suggest_price_stream(
        &self,
        query: &PriceQuery,
        options: StreamOptions,
        callbacks: StreamCallbacks,
    ) -> Result<PriceSuggestion, GenerateError> {
        let request = GenerateRequest::new(price_prompt(query));
        let options = options.policy(LinePolicy::Verbatim);
        let Completion { text, .. } = self.generate_stream(&request, options, callbacks).await?;

        let popularity = query.popularity();
        let ai_response = clean_response(&text);
        Ok(PriceSuggestion {
            rule_price: rule_based_price(query.current_price, query.rating, popularity),
            ai_price: extract_price(&ai_response),
            popularity,
            ai_response,
        })
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    struct FixedGenerator(Result<&'static str, ()>);

    impl Generator for FixedGenerator {
        fn generate(
            &self,
            _request: GenerateRequest,
        ) -> impl Future<Output = Result<Completion, GenerateError>> + Send {
            let result = match self.0 {
                Ok(text) => Ok(Completion {
                    text: text.to_string(),
                    ..Default::default()
                }),
                Err(()) => Err(GenerateError::ServiceUnavailable("down".into())),
            };
            async move { result }
        }
    }

    fn query() -> PriceQuery {
        PriceQuery {
            product_name: "杭州".into(),
            current_price: 200.0,
            rating: 4.5,
            popularity: None,
        }
    }

    #[test]
    fn rule_price_formula() {
        assert_eq!(rule_based_price(200.0, 4.5, 10_000), 551.0);
        assert_eq!(rule_based_price(99.9, 3.0, 0), 349.95);
    }

    #[test]
    fn prompt_mentions_inputs() {
        let prompt = price_prompt(&query());
        assert!(prompt.contains("杭州"));
        assert!(prompt.contains("200"));
        assert!(prompt.contains("4.5"));
    }

    #[test]
    fn extract_price_takes_first_number() {
        assert_eq!(extract_price("建议价格：328.456元"), Some(328.46));
        assert_eq!(extract_price("150 or 200"), Some(150.0));
        assert_eq!(extract_price("12."), Some(12.0));
        assert_eq!(extract_price("no number here"), None);
    }

    #[test]
    fn extract_price_reads_non_ascii_digits() {
        assert_eq!(extract_price("建议价格：３００元"), Some(300.0));
        assert_eq!(extract_price("评分４.5，建议 388 元"), Some(4.5));
        assert_eq!(extract_price("السعر ٤٢٠"), Some(420.0));
        // U+1D7D9, U+1D7DA: double-struck one and two, the second run of a
        // block of five adjacent digit runs.
        assert_eq!(extract_price("𝟙𝟚.5"), Some(12.5));
    }

    #[tokio::test]
    async fn suggestion_uses_generator_answer() {
        let generator = FixedGenerator(Ok("299"));
        let suggestion = suggest_price(&generator, &query()).await;
        assert_eq!(suggestion.rule_price, 551.0);
        assert_eq!(suggestion.ai_price, Some(299.0));
        assert_eq!(suggestion.popularity, DEFAULT_POPULARITY);
        assert_eq!(suggestion.ai_response, "299");
    }

    #[tokio::test]
    async fn generator_failure_degrades_to_rule_price() {
        let generator = FixedGenerator(Err(()));
        let suggestion = suggest_price(&generator, &query()).await;
        assert_eq!(suggestion.rule_price, 551.0);
        assert_eq!(suggestion.ai_price, None);
        assert!(suggestion.ai_response.is_empty());
    }

    #[test]
    fn explicit_popularity_is_used() {
        let q = PriceQuery {
            popularity: Some(50_000),
            ..query()
        };
        assert_eq!(q.popularity(), 50_000);
    }
}
