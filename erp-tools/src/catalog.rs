//! The assistant's business tools over a [`LookupStore`].

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use erp_store::{LookupStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::definition::{ToolDefinition, TypedTool};
use crate::error::ToolResult;
use crate::registry::ToolRegistry;
use crate::shape::{FieldType, Shape, ToolShape};

/// Agent name advertised alongside the tool list.
pub const AGENT_NAME: &str = "1c_assistant";

/// System instruction for the model that drives the tools.
pub const AGENT_INSTRUCTION: &str = "Ты — дружелюбный и эффективный AI-ассистент для работы с системой 1С. \
Твоя задача — отвечать на вопросы пользователя, используя предоставленные тебе инструменты. \
Всегда отвечай на русском языке.";

/// Wire name of the stock balance query.
pub const STOCK_BALANCE_TOOL: &str = "get_stock_balance";

/// Wire name of the counterparty debt query.
pub const COUNTERPARTY_DEBT_TOOL: &str = "get_counterparty_debt";

const STOCK_BALANCE_DESCRIPTION: &str = "Получить остаток товара на складе по его названию.";
const COUNTERPARTY_DEBT_DESCRIPTION: &str =
    "Получить текущую задолженность клиента (контрагента) по его названию.";

/// What a handler does when the store has no record for the requested key.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Report `not_found` to the caller.
    #[default]
    Surface,
    /// Log the miss and answer with a zero value.
    ZeroDefault,
}

impl MissPolicy {
    fn recover<T>(self, tool: &'static str, err: StoreError, fallback: T) -> ToolResult<T> {
        if self == Self::ZeroDefault
            && let StoreError::NotFound { kind, key } = &err
        {
            warn!(tool, %kind, %key, "lookup miss answered with zero value");
            return Ok(fallback);
        }
        Err(err.into())
    }
}

impl Display for MissPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Surface => "surface",
            Self::ZeroDefault => "zero_default",
        })
    }
}

impl FromStr for MissPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "surface" => Ok(Self::Surface),
            "zero_default" | "zero" => Ok(Self::ZeroDefault),
            other => Err(format!(
                "unknown miss policy `{other}` (expected `surface` or `zero_default`)"
            )),
        }
    }
}

/// Arguments of [`STOCK_BALANCE_TOOL`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GetStockBalanceParams {
    /// Product name as spoken by the user.
    pub product_name: String,
}

impl ToolShape for GetStockBalanceParams {
    fn shape() -> Shape {
        Shape::new().described_field("product_name", FieldType::String, "Название товара.")
    }

    fn example() -> Self {
        Self {
            product_name: "монитор 24 дюйма".into(),
        }
    }
}

/// Result of [`STOCK_BALANCE_TOOL`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GetStockBalanceOutput {
    /// Units in stock.
    pub stock_balance: i64,
}

impl ToolShape for GetStockBalanceOutput {
    fn shape() -> Shape {
        Shape::new().described_field("stock_balance", FieldType::Integer, "Остаток на складе.")
    }

    fn example() -> Self {
        Self::default()
    }
}

/// Arguments of [`COUNTERPARTY_DEBT_TOOL`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GetCounterpartyDebtParams {
    /// Counterparty name as spoken by the user.
    pub counterparty_name: String,
}

impl ToolShape for GetCounterpartyDebtParams {
    fn shape() -> Shape {
        Shape::new().described_field(
            "counterparty_name",
            FieldType::String,
            "Название контрагента.",
        )
    }

    fn example() -> Self {
        Self {
            counterparty_name: "ооо ромашка".into(),
        }
    }
}

/// Result of [`COUNTERPARTY_DEBT_TOOL`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GetCounterpartyDebtOutput {
    /// Amount owed by the counterparty.
    pub debt: f64,
}

impl ToolShape for GetCounterpartyDebtOutput {
    fn shape() -> Shape {
        Shape::new().described_field("debt", FieldType::Float, "Сумма задолженности.")
    }

    fn example() -> Self {
        Self::default()
    }
}

/// Stock balance lookup bound to a store.
#[derive(Debug, Clone)]
pub struct StockBalanceTool {
    store: Arc<LookupStore>,
    policy: MissPolicy,
}

impl StockBalanceTool {
    /// Creates the handler.
    #[must_use]
    pub fn new(store: Arc<LookupStore>, policy: MissPolicy) -> Self {
        Self { store, policy }
    }
}

impl TypedTool for StockBalanceTool {
    type Input = GetStockBalanceParams;
    type Output = GetStockBalanceOutput;

    fn call(&self, input: Self::Input) -> ToolResult<Self::Output> {
        match self.store.stock_balance(&input.product_name) {
            Ok(stock_balance) => Ok(GetStockBalanceOutput { stock_balance }),
            Err(err) => self
                .policy
                .recover(STOCK_BALANCE_TOOL, err, GetStockBalanceOutput::default()),
        }
    }
}

/// Counterparty debt lookup bound to a store.
#[derive(Debug, Clone)]
pub struct CounterpartyDebtTool {
    store: Arc<LookupStore>,
    policy: MissPolicy,
}

impl CounterpartyDebtTool {
    /// Creates the handler.
    #[must_use]
    pub fn new(store: Arc<LookupStore>, policy: MissPolicy) -> Self {
        Self { store, policy }
    }
}

impl TypedTool for CounterpartyDebtTool {
    type Input = GetCounterpartyDebtParams;
    type Output = GetCounterpartyDebtOutput;

    fn call(&self, input: Self::Input) -> ToolResult<Self::Output> {
        match self.store.counterparty_debt(&input.counterparty_name) {
            Ok(debt) => Ok(GetCounterpartyDebtOutput { debt }),
            Err(err) => self
                .policy
                .recover(COUNTERPARTY_DEBT_TOOL, err, GetCounterpartyDebtOutput::default()),
        }
    }
}

/// Definitions of every business tool, in publication order.
///
/// # Errors
///
/// Returns [`ToolError::Configuration`](crate::ToolError::Configuration) if a
/// definition fails to bind.
pub fn standard_definitions(
    store: &Arc<LookupStore>,
    policy: MissPolicy,
) -> ToolResult<Vec<ToolDefinition>> {
    Ok(vec![
        ToolDefinition::new(
            STOCK_BALANCE_TOOL,
            STOCK_BALANCE_DESCRIPTION,
            StockBalanceTool::new(Arc::clone(store), policy),
        )?,
        ToolDefinition::new(
            COUNTERPARTY_DEBT_TOOL,
            COUNTERPARTY_DEBT_DESCRIPTION,
            CounterpartyDebtTool::new(Arc::clone(store), policy),
        )?,
    ])
}

/// Registry holding every business tool bound to `store`.
///
/// # Errors
///
/// Returns a configuration error if binding or registration fails.
pub fn standard_registry(
    store: &Arc<LookupStore>,
    policy: MissPolicy,
) -> ToolResult<ToolRegistry> {
    ToolRegistry::from_definitions(standard_definitions(store, policy)?)
}

/// Everything the external caller needs to drive the registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Agent name.
    pub agent: String,
    /// System instruction for the driving model.
    pub instruction: String,
    /// Function declarations, one per tool.
    pub tools: Vec<Value>,
}

/// Builds the manifest published for `registry`.
#[must_use]
pub fn manifest(registry: &ToolRegistry) -> Manifest {
    Manifest {
        agent: AGENT_NAME.to_owned(),
        instruction: AGENT_INSTRUCTION.to_owned(),
        tools: registry
            .list_definitions()
            .iter()
            .map(crate::definition::ToolDescriptor::function_declaration)
            .collect(),
    }
}
