use async_trait::async_trait;
use orchestrator_core::{OrchestratorError, OrchestratorResult};
use orchestrator_domain::{operation, Intent, IntentSource, Parameters};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// 关键词表：名称 -> 关键词列表，按声明顺序决定平局时的优先级
pub type KeywordTable = Vec<(String, Vec<String>)>;

/// 参数短语在这些词处截断
const STOP_WORDS: &[&str] = &["to", "from", "in", "at", "for", "with", "please"];

fn table(entries: &[(&str, &[&str])]) -> KeywordTable {
    entries
        .iter()
        .map(|(name, keywords)| {
            (
                name.to_string(),
                keywords.iter().map(|keyword| keyword.to_string()).collect(),
            )
        })
        .collect()
}

pub fn default_domain_keywords() -> KeywordTable {
    table(&[
        (
            "mobility",
            &["cab", "taxi", "ride", "transportation", "drive", "car", "auto", "rickshaw"],
        ),
        (
            "food",
            &[
                "eat", "food", "restaurant", "delivery", "hungry", "meal", "lunch", "dinner",
                "breakfast", "pizza", "burger", "biryani",
            ],
        ),
        (
            "retail",
            &["shop", "buy", "purchase", "order", "shopping", "product", "item"],
        ),
    ])
}

pub fn default_operation_keywords() -> KeywordTable {
    table(&[
        (operation::SEARCH, &["find", "search", "look for", "get", "show"]),
        (operation::SELECT, &["choose", "select", "pick"]),
        (operation::INIT, &["initiate", "start", "begin"]),
        (operation::CONFIRM, &["confirm", "book", "order", "buy"]),
    ])
}

struct CompiledKeywords {
    name: String,
    pattern: Regex,
}

impl CompiledKeywords {
    fn compile(table: KeywordTable) -> OrchestratorResult<Vec<Self>> {
        table
            .into_iter()
            .filter(|(_, keywords)| !keywords.is_empty())
            .map(|(name, keywords)| {
                let alternatives = keywords
                    .iter()
                    .map(|keyword| regex::escape(&keyword.to_lowercase()))
                    .collect::<Vec<_>>()
                    .join("|");
                let pattern = Regex::new(&format!(r"\b(?:{alternatives})\b")).map_err(|e| {
                    OrchestratorError::config_error(format!("关键词表 '{name}' 无效: {e}"))
                })?;
                Ok(Self { name, pattern })
            })
            .collect()
    }

    /// 命中次数最多者胜出，平局取表中靠前者
    fn best_match<'a>(entries: &'a [Self], query: &str) -> Option<&'a str> {
        let mut best: Option<(&str, usize)> = None;
        for entry in entries {
            let hits = entry.pattern.find_iter(query).count();
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((entry.name.as_str(), hits));
            }
        }
        best.map(|(name, _)| name)
    }
}

struct ParameterPatterns {
    destination: Regex,
    origin: Regex,
    time: Regex,
    product: Regex,
    dish: Regex,
}

impl ParameterPatterns {
    fn compile() -> OrchestratorResult<Self> {
        let build = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| OrchestratorError::config_error(format!("参数表达式无效: {e}")))
        };

        Ok(Self {
            destination: build(r"\bto\s+([a-z\s]+)")?,
            origin: build(r"\bfrom\s+([a-z\s]+)")?,
            time: build(r"\b(?:in|at)\s+\d+\s+(?:minutes?|hours?|am|pm)\b")?,
            product: build(r"\b(?:buy|purchase|order|find|get)\s+([a-z0-9\s]+)")?,
            dish: build(r"\b(?:order|get|want|like)\s+([a-z\s,]+)")?,
        })
    }
}

/// 基于关键词的意图映射器
///
/// 领域和操作由可替换的关键词表决定，参数按领域用正则提取。
/// 请求中没有领域关键词时沿用上下文中的 `domain`。
/// 请求上下文中的 `transaction_id` 会复制为参数 `transactionId`；没有进行中的交易时
/// 操作一律视为 search。
pub struct KeywordIntentMapper {
    domains: Vec<CompiledKeywords>,
    operations: Vec<CompiledKeywords>,
    patterns: ParameterPatterns,
}

impl KeywordIntentMapper {
    pub fn new() -> OrchestratorResult<Self> {
        Self::with_tables(default_domain_keywords(), default_operation_keywords())
    }

    pub fn with_tables(domains: KeywordTable, operations: KeywordTable) -> OrchestratorResult<Self> {
        Ok(Self {
            domains: CompiledKeywords::compile(domains)?,
            operations: CompiledKeywords::compile(operations)?,
            patterns: ParameterPatterns::compile()?,
        })
    }

    pub fn detect_domain(&self, query: &str) -> Option<String> {
        CompiledKeywords::best_match(&self.domains, &query.to_lowercase()).map(str::to_string)
    }

    pub fn detect_operation(&self, query: &str) -> Option<String> {
        CompiledKeywords::best_match(&self.operations, &query.to_lowercase()).map(str::to_string)
    }

    fn extract_parameters(&self, query: &str, domain: &str) -> Parameters {
        let mut parameters = Parameters::new();
        match domain {
            "mobility" => {
                if let Some(destination) = capture_phrase(&self.patterns.destination, query) {
                    parameters.insert("destination".to_string(), destination.into());
                }
                let origin = capture_phrase(&self.patterns.origin, query)
                    .unwrap_or_else(|| "current location".to_string());
                parameters.insert("origin".to_string(), origin.into());
                if let Some(time) = self.patterns.time.find(query) {
                    parameters.insert("time".to_string(), time.as_str().into());
                }
            }
            "retail" => {
                if let Some(product) = capture_phrase(&self.patterns.product, query) {
                    parameters.insert("product".to_string(), product.into());
                }
                let delivery = query.contains("deliver");
                parameters.insert("delivery".to_string(), delivery.into());
            }
            "food" => {
                if let Some(restaurant) = capture_phrase(&self.patterns.origin, query) {
                    parameters.insert("restaurant".to_string(), restaurant.into());
                }
                if let Some(food) = capture_phrase(&self.patterns.dish, query) {
                    parameters.insert("food".to_string(), food.into());
                }
                let delivery = !query.contains("dine in") && !query.contains("dine-in");
                parameters.insert("delivery".to_string(), delivery.into());
            }
            _ => {}
        }
        parameters
    }
}

/// 取第一个捕获组，遇到停用词截断
fn capture_phrase(pattern: &Regex, query: &str) -> Option<String> {
    let captured = pattern.captures(query)?.get(1)?.as_str();
    let phrase = captured
        .split_whitespace()
        .take_while(|word| !STOP_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ");
    let phrase = phrase.trim_end_matches(',').trim();
    (!phrase.is_empty()).then(|| phrase.to_string())
}

#[async_trait]
impl IntentSource for KeywordIntentMapper {
    async fn extract(&self, query: &str, context: &Parameters) -> OrchestratorResult<Option<Intent>> {
        let normalized = query.to_lowercase();

        let context_domain = context
            .get("domain")
            .and_then(Value::as_str)
            .filter(|domain| !domain.trim().is_empty());

        let Some(domain) =
            CompiledKeywords::best_match(&self.domains, &normalized).or(context_domain)
        else {
            debug!("No domain matched query: {}", query);
            return Ok(None);
        };

        let mut parameters = self.extract_parameters(&normalized, domain);
        let transaction_id = context
            .get("transaction_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty());

        let operation = match transaction_id {
            Some(id) => {
                parameters.insert("transactionId".to_string(), id.into());
                CompiledKeywords::best_match(&self.operations, &normalized)
                    .unwrap_or(operation::SEARCH)
            }
            None => operation::SEARCH,
        };

        debug!(domain = %domain, operation = %operation, "Mapped query to intent");

        Ok(Some(Intent {
            domain: domain.to_string(),
            operation: operation.to_string(),
            parameters,
            context: context.clone(),
        }))
    }
}
