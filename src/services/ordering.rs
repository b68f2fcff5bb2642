//! Разбор параметра `?ordering=` для списка событий.
//!
//! Поддерживаются поля `id`, `title`, `start_time`, `seats`, `avg_rating`,
//! перечисленные через запятую, с префиксом `-` для убывания. Неизвестные
//! поля пропускаются. Последним ключом всегда идет `id` по возрастанию.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Id,
    Title,
    StartTime,
    Seats,
    AvgRating,
}

impl OrderField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(OrderField::Id),
            "title" => Some(OrderField::Title),
            "start_time" => Some(OrderField::StartTime),
            "seats" => Some(OrderField::Seats),
            "avg_rating" => Some(OrderField::AvgRating),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            OrderField::Id => "id",
            OrderField::Title => "title",
            OrderField::StartTime => "start_time",
            OrderField::Seats => "seats",
            OrderField::AvgRating => "avg_rating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub field: OrderField,
    pub descending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOrdering {
    keys: Vec<OrderKey>,
}

impl EventOrdering {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut keys: Vec<OrderKey> = Vec::new();
        for part in raw.unwrap_or_default().split(',') {
            let part = part.trim();
            let (descending, name) = match part.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, part),
            };
            match OrderField::parse(name) {
                Some(field) if !keys.iter().any(|k| k.field == field) => {
                    keys.push(OrderKey { field, descending })
                }
                Some(_) => {}
                None if part.is_empty() => {}
                None => tracing::debug!("ignoring unknown ordering field {:?}", part),
            }
        }
        Self { keys }
    }

    pub fn keys(&self) -> &[OrderKey] {
        &self.keys
    }

    /// Каноническая запись, пригодная для ключа кеша.
    pub fn cache_key(&self) -> String {
        if self.keys.is_empty() {
            return "default".to_string();
        }
        self.keys
            .iter()
            .map(|k| format!("{}{}", if k.descending { "-" } else { "" }, k.field.name()))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Тело `ORDER BY` для запроса списка. Запрос обязан использовать
    /// алиасы `e` (events) и `r` (ratings).
    ///
    /// События без оценок считаются наименьшими: при убывании идут
    /// последними, при возрастании первыми. Выражение одинаково работает
    /// в PostgreSQL и SQLite.
    pub fn order_by_clause(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for key in &self.keys {
            let dir = if key.descending { "DESC" } else { "ASC" };
            match key.field {
                OrderField::AvgRating => {
                    let nulls = if key.descending { "ASC" } else { "DESC" };
                    parts.push(format!("(AVG(r.score) IS NULL) {}", nulls));
                    parts.push(format!("AVG(r.score) {}", dir));
                }
                OrderField::Id => parts.push(format!("e.id {}", dir)),
                OrderField::Title => parts.push(format!("e.title {}", dir)),
                OrderField::StartTime => parts.push(format!("e.start_time {}", dir)),
                OrderField::Seats => parts.push(format!("e.seats {}", dir)),
            }
        }
        if !self.keys.iter().any(|k| k.field == OrderField::Id) {
            parts.push("e.id ASC".to_string());
        }
        parts.join(", ")
    }
}
