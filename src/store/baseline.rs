use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::revision::{module_names, RevisionKey};

/// Rough age of a cell's technology, used by the UI for shading.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PeriodTag {
    Empty,
    Early,
    Modern,
    Current,
}

impl PeriodTag {
    /// The shading a freshly filled cell gets, by column.
    pub fn for_revision(key: RevisionKey) -> PeriodTag {
        match key {
            RevisionKey::Rev1 | RevisionKey::Rev2 => PeriodTag::Early,
            RevisionKey::Rev3 | RevisionKey::Rev4 => PeriodTag::Modern,
            RevisionKey::Rev5 => PeriodTag::Current,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RevisionData {
    pub tech: String,
    pub period: PeriodTag,
    pub desc: String,
}

impl RevisionData {
    pub fn empty(desc: impl Into<String>) -> Self {
        Self {
            tech: String::new(),
            period: PeriodTag::Empty,
            desc: desc.into(),
        }
    }
}

/// All five revision slots of one matrix row. Every key is always present;
/// an empty slot is `tech: "", period: empty`, never a missing field.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ModuleRevisions {
    pub rev1: RevisionData,
    pub rev2: RevisionData,
    pub rev3: RevisionData,
    pub rev4: RevisionData,
    pub rev5: RevisionData,
}

impl ModuleRevisions {
    pub fn get(&self, key: RevisionKey) -> &RevisionData {
        match key {
            RevisionKey::Rev1 => &self.rev1,
            RevisionKey::Rev2 => &self.rev2,
            RevisionKey::Rev3 => &self.rev3,
            RevisionKey::Rev4 => &self.rev4,
            RevisionKey::Rev5 => &self.rev5,
        }
    }

    pub fn get_mut(&mut self, key: RevisionKey) -> &mut RevisionData {
        match key {
            RevisionKey::Rev1 => &mut self.rev1,
            RevisionKey::Rev2 => &mut self.rev2,
            RevisionKey::Rev3 => &mut self.rev3,
            RevisionKey::Rev4 => &mut self.rev4,
            RevisionKey::Rev5 => &mut self.rev5,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ModuleData {
    pub name: String,
    pub revisions: ModuleRevisions,
}

/// Matrix responses are wrapped so the UI receives `{"modules": [...]}`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EvolutionData {
    pub modules: Vec<ModuleData>,
}

fn rev(tech: &str, period: PeriodTag, desc: &str) -> RevisionData {
    RevisionData {
        tech: tech.to_string(),
        period,
        desc: desc.to_string(),
    }
}

fn module(name: &str, revisions: [RevisionData; 5]) -> ModuleData {
    let [rev1, rev2, rev3, rev4, rev5] = revisions;
    ModuleData {
        name: name.to_string(),
        revisions: ModuleRevisions {
            rev1,
            rev2,
            rev3,
            rev4,
            rev5,
        },
    }
}

/// The hand-authored ground-truth matrix: eight modules across five
/// revisions of scalping trading machines, 2000-2025.
pub fn baseline() -> Vec<ModuleData> {
    use PeriodTag::*;
    vec![
        module(
            module_names::DATA_COLLECTION,
            [
                rev("Reuters API, Bloomberg", Early, "Базовые рыночные данные через API"),
                rev("WebSocket, FIX, CCXT", Early, "Данные в реальном времени + криптобиржи"),
                rev("Market Data Lakes", Modern, "Централизованные хранилища рыночных данных"),
                rev("Streaming Analytics", Modern, "Потоковая обработка данных"),
                rev("Multi-modal Data", Current, "Объединение различных типов данных"),
            ],
        ),
        module(
            module_names::DATA_PROCESSING,
            [
                rev("Excel, CSV", Early, "Ручная обработка в табличных редакторах"),
                rev("Pandas, NumPy", Early, "Python библиотеки для анализа данных"),
                rev("Apache Spark", Modern, "Распределённая обработка больших данных"),
                rev("Polars, DuckDB", Modern, "Высокопроизводительная аналитика"),
                rev("Ray, Dask", Current, "Масштабируемые вычисления"),
            ],
        ),
        module(
            module_names::FEATURE_ENGINEERING,
            [
                rev("Technical Indicators", Early, "RSI, MACD, SMA - классические индикаторы"),
                rev("Statistical Features", Early, "Волатильность, корреляции, возвраты"),
                rev("Auto Feature Selection", Modern, "Автоматический отбор признаков"),
                rev("Graph Features", Modern, "Признаки на основе графов"),
                rev("Learned Representations", Current, "Обученные представления данных"),
            ],
        ),
        module(
            module_names::SIGNAL_GENERATION,
            [
                rev("Rule-based", Early, "Системы на основе правил"),
                rev("SVM, Random Forest", Early, "Классические алгоритмы ML"),
                rev("LSTM, CNN", Modern, "Глубокие нейронные сети"),
                rev("Transformer LOB", Modern, "Трансформеры для анализа стакана"),
                rev("Multi-Agent RL", Current, "Многоагентное обучение с подкреплением"),
            ],
        ),
        module(
            module_names::RISK_MANAGEMENT,
            [
                rev("Fixed Stop-Loss", Early, "Фиксированные уровни стоп-лосс"),
                rev("VaR Models", Early, "Модели стоимости под риском"),
                rev("Dynamic Hedging", Modern, "Динамическое хеджирование"),
                rev("RL-based Risk", Modern, "Риск-менеджмент на основе RL"),
                rev("Adaptive Risk Models", Current, "Адаптивные модели управления рисками"),
            ],
        ),
        module(
            module_names::EXECUTION,
            [
                rev("Market Orders", Early, "Простые рыночные ордера"),
                rev("Smart Routing", Early, "Умная маршрутизация ордеров"),
                rev("TWAP/VWAP", Modern, "Алгоритмы исполнения TWAP/VWAP"),
                rev("RL Execution", Modern, "Исполнение на основе RL"),
                rev("Game-theoretic", Current, "Игровые стратегии исполнения"),
            ],
        ),
        module(
            module_names::MARKET_ADAPTATION,
            [
                RevisionData::empty("Отсутствие адаптации"),
                rev("Regime Detection", Early, "Детекция режимов рынка"),
                rev("Online Learning", Modern, "Онлайн обучение"),
                rev("Meta-Learning", Modern, "Мета-обучение"),
                rev("Continual Learning", Current, "Непрерывное обучение"),
            ],
        ),
        module(
            module_names::VISUALIZATION,
            [
                rev("Excel Charts", Early, "Простые графики в Excel"),
                rev("Matplotlib, R", Early, "Программная визуализация данных"),
                rev("Plotly, D3.js", Modern, "Интерактивные веб-дашборды"),
                rev("Real-time Dashboards", Modern, "Мониторинг в реальном времени"),
                rev("AI-powered Analytics", Current, "ИИ-анализ паттернов и аномалий"),
            ],
        ),
    ]
}

/// Presentational hierarchy of ML technique families for the tree view.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

static TREE_JSON: &str = include_str!("../../data/tree.json");

pub fn tree() -> Result<TreeNode> {
    serde_json::from_str(TREE_JSON).context("technology tree is malformed")
}
