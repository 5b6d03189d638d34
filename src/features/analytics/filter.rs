use serde::{Deserialize, Serialize};

/// 表示“不过滤”的哨兵值
pub const ALL: &str = "all";

/// 分析查询的可选等值过滤条件。
///
/// 字段缺失、空白或等于 `"all"` 都表示该字段不加约束。
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema, utoipa::IntoParams,
)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "SUV")]
    pub vehicle_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_type: Option<String>,
    /// 对应主要充电地点类别
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
}

/// 字段与列的固定对应关系，顺序即参数绑定顺序
const FIELD_COLUMNS: [&str; 3] = ["vehicle_type", "usage_type", "primary_charging_location"];

impl FilterSet {
    fn active_values(&self) -> [Option<&str>; 3] {
        fn pick(v: &Option<String>) -> Option<&str> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty() && *s != ALL)
        }
        [
            pick(&self.vehicle_type),
            pick(&self.usage_type),
            pick(&self.location_type),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.active_values().iter().all(Option::is_none)
    }

    /// 直接查询提交表时使用的谓词（列名不带表别名）
    pub fn predicate(&self) -> Predicate {
        self.build(None)
    }

    /// 联表查询时使用的谓词（列名前加 `alias.`）
    pub fn predicate_qualified(&self, alias: &str) -> Predicate {
        self.build(Some(alias))
    }

    fn build(&self, alias: Option<&str>) -> Predicate {
        let mut columns = Vec::new();
        let mut params = Vec::new();
        for (column, value) in FIELD_COLUMNS.iter().zip(self.active_values()) {
            if let Some(value) = value {
                columns.push(match alias {
                    Some(a) => format!("{a}.{column}"),
                    None => (*column).to_string(),
                });
                params.push(value.to_string());
            }
        }
        Predicate { columns, params }
    }
}

/// AND 连接的参数化等值谓词；`params[i]` 绑定到 `columns[i]` 对应的 `?`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    pub columns: Vec<String>,
    pub params: Vec<String>,
}

impl Predicate {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// 不含 `WHERE` 的片段；空谓词返回空串
    pub fn fragment(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// 带前导 `WHERE` 的子句；空谓词返回空串
    pub fn where_clause(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.fragment())
        }
    }
}
