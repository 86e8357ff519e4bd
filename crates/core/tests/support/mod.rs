#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;

use queryfn_core::prelude::*;

/// A probe that answers from a script keyed by the exact probe SQL.
#[derive(Default)]
pub struct ScriptedProbe {
    responses: HashMap<String, Result<Vec<ProbeColumn>, String>>,
    pub calls: Vec<(String, Vec<Value>)>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, sql: &str, columns: &[(&str, &str)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, ty)| ProbeColumn::new(*name, *ty))
            .collect();
        self.responses.insert(sql.to_string(), Ok(columns));
        self
    }

    pub fn failure(mut self, sql: &str, message: &str) -> Self {
        self.responses.insert(sql.to_string(), Err(message.to_string()));
        self
    }
}

impl Probe for ScriptedProbe {
    fn probe(
        &mut self,
        sql: &str,
        bindings: &[Value],
    ) -> impl Future<Output = Result<Vec<ProbeColumn>, sqlx::Error>> {
        self.calls.push((sql.to_string(), bindings.to_vec()));
        let response = match self.responses.get(sql) {
            Some(Ok(columns)) => Ok(columns.clone()),
            Some(Err(message)) => Err(sqlx::Error::Protocol(message.clone())),
            None => Ok(Vec::new()),
        };
        std::future::ready(response)
    }
}
