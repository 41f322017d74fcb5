use crate::{Parameters, Quote, Result, Value};
use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?|:\w+").expect("placeholder regex is valid"));

/// Passive record of the last query run through a driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profiler {
    sql: String,
    parameters: Parameters,
    execution_time: f64,
}

impl Profiler {
    pub fn new() -> Self {
        Default::default()
    }

    /// Start recording a new query, forgetting parameters and timing of the previous one.
    pub fn set_sql(&mut self, sql: &str) -> &mut Self {
        self.sql = sql.into();
        self.parameters = Parameters::new();
        self.execution_time = 0.0;
        self
    }

    pub fn set_parameters(&mut self, parameters: Parameters) -> &mut Self {
        self.parameters = parameters;
        self
    }

    pub fn set_execution_time(&mut self, seconds: f64) -> &mut Self {
        self.execution_time = seconds;
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }

    /// The recorded query with every placeholder replaced by its quoted value.
    ///
    /// `?` consume the positional parameters in order, `:name` look up the
    /// named ones. Placeholders without a parameter render as `NULL`.
    pub fn interpolate<Q: Quote + ?Sized>(&self, quoter: &Q) -> Result<String> {
        if self.parameters.is_empty() {
            return Ok(self.sql.clone());
        }
        let mut result = String::with_capacity(self.sql.len());
        let mut last = 0;
        let mut position = 0;
        for placeholder in PLACEHOLDER.find_iter(&self.sql) {
            let param = if placeholder.as_str() == "?" {
                position += 1;
                self.parameters.positional(position - 1)
            } else {
                self.parameters.named(placeholder.as_str())
            };
            let quoted = match param {
                Some(param) => quoter.quote(&param.value, param.hint)?,
                None => quoter.quote(&Value::Null, None)?,
            };
            result.push_str(&self.sql[last..placeholder.start()]);
            result.push_str(&quoted);
            last = placeholder.end();
        }
        result.push_str(&self.sql[last..]);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParamType, params};

    struct Naive;

    impl Quote for Naive {
        fn quote(&self, value: &Value, hint: Option<ParamType>) -> Result<String> {
            Ok(match ParamType::guess(value, hint) {
                ParamType::Null => "NULL".into(),
                ParamType::Int => value.to_string(),
                _ => format!("'{}'", value),
            })
        }
    }

    #[test]
    fn set_sql_resets() {
        let mut profiler = Profiler::new();
        profiler
            .set_sql("SELECT ?")
            .set_parameters(params![1])
            .set_execution_time(0.5);
        profiler.set_sql("SELECT 2");
        assert_eq!(profiler.sql(), "SELECT 2");
        assert!(profiler.parameters().is_empty());
        assert_eq!(profiler.execution_time(), 0.0);
    }

    #[test]
    fn positional_placeholders() {
        let mut profiler = Profiler::new();
        profiler
            .set_sql("SELECT * FROM t WHERE a = ? AND b = ? AND c = ?")
            .set_parameters(params![1, "x"]);
        assert_eq!(
            profiler.interpolate(&Naive).unwrap(),
            "SELECT * FROM t WHERE a = 1 AND b = 'x' AND c = NULL"
        );
    }

    #[test]
    fn named_placeholders() {
        let mut profiler = Profiler::new();
        profiler
            .set_sql("SELECT * FROM city WHERE area = :area AND year > :year")
            .set_parameters(params! { ":area" => "China", "year" => 2010 });
        assert_eq!(
            profiler.interpolate(&Naive).unwrap(),
            "SELECT * FROM city WHERE area = 'China' AND year > 2010"
        );
    }

    #[test]
    fn no_parameters_verbatim() {
        let mut profiler = Profiler::new();
        profiler.set_sql("SELECT ':not_a_param', ?");
        assert_eq!(profiler.interpolate(&Naive).unwrap(), "SELECT ':not_a_param', ?");
    }
}
