//! Statement accumulator - collects generated fragments and assembles
//! the final statement.

use crate::sql::token::{Token, TokenStream};

/// Collects select items, predicates, grouping entries, join fragments,
/// and outer columns as the compilers produce them, then concatenates
/// everything into one statement.
///
/// Created empty per compilation call and discarded at its end.
#[derive(Debug, Clone, Default)]
pub struct StatementAccumulator {
    select_items: Vec<TokenStream>,
    where_predicates: Vec<TokenStream>,
    group_by: Vec<TokenStream>,
    having_predicates: Vec<TokenStream>,
    joins: Vec<TokenStream>,
    outer_columns: Vec<TokenStream>,
}

impl StatementAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_select(&mut self, item: TokenStream) {
        self.select_items.push(item);
    }

    pub fn push_where(&mut self, predicate: TokenStream) {
        self.where_predicates.push(predicate);
    }

    /// Add a GROUP BY entry; entries dedupe by token equality, so a join
    /// key that is also a requested grouping column appears once.
    pub fn push_group_by(&mut self, entry: TokenStream) {
        if !self.group_by.contains(&entry) {
            self.group_by.push(entry);
        }
    }

    pub fn push_having(&mut self, predicate: TokenStream) {
        self.having_predicates.push(predicate);
    }

    pub fn push_join(&mut self, join: TokenStream) {
        self.joins.push(join);
    }

    pub fn push_outer_column(&mut self, column: TokenStream) {
        self.outer_columns.push(column);
    }

    /// Assemble the final statement:
    ///
    /// ```text
    /// SELECT <outer columns>
    /// FROM ( SELECT ... FROM <fact> [WHERE ...] [GROUP BY ...] [HAVING ...] ) AS <factAlias>
    /// [<join fragments>]
    /// ```
    pub fn assemble(&self, fact_table: &str, fact_alias: &str) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Select).space();
        append_list(&mut ts, &self.outer_columns);

        ts.space().push(Token::From).space();
        ts.lparen();

        ts.push(Token::Select).space();
        append_list(&mut ts, &self.select_items);
        ts.space()
            .push(Token::From)
            .space()
            .push(Token::Ident(fact_table.into()));

        if !self.where_predicates.is_empty() {
            ts.space().push(Token::Where).space();
            append_predicates(&mut ts, &self.where_predicates);
        }

        if !self.group_by.is_empty() {
            ts.space().push(Token::GroupBy).space();
            append_list(&mut ts, &self.group_by);
        }

        if !self.having_predicates.is_empty() {
            ts.space().push(Token::Having).space();
            append_predicates(&mut ts, &self.having_predicates);
        }

        ts.rparen()
            .space()
            .push(Token::As)
            .space()
            .push(Token::Ident(fact_alias.into()));

        for join in &self.joins {
            ts.space();
            ts.append(join);
        }

        ts
    }
}

/// Append comma-separated fragments.
fn append_list(ts: &mut TokenStream, items: &[TokenStream]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(item);
    }
}

/// Append AND-combined predicates.
fn append_predicates(ts: &mut TokenStream, predicates: &[TokenStream]) {
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            ts.space().push(Token::And).space();
        }
        ts.append(predicate);
    }
}
