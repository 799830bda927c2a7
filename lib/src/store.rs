use chrono::Utc;
use serde_json::Value;
use std::{
	collections::{hash_map::Entry, HashMap},
	sync::Arc,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use gridbase_core::{
	http::{
		ApplicationParams, QueryParams, RowParams, SearchRowsRequest, TableParams, UserParams,
	},
	model::{Application, ColumnType, Query, Row, Table, User},
};

use crate::errors::{ValidationError, ValidationErrorSet};

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
	#[error("The requested {0} does not exist")]
	NotFound(&'static str),

	#[error("Failed to validate row: {0}")]
	Validation(#[from] ValidationErrorSet),
}

pub type Extension = axum::Extension<Arc<Store>>;

/// The platform's in-memory registry of resources.
#[derive(Debug, Default)]
pub struct Store {
	applications: RwLock<HashMap<String, Application>>,
	tables: RwLock<HashMap<String, Table>>,
	rows: RwLock<HashMap<String, Row>>,
	users: RwLock<HashMap<String, User>>,
	queries: RwLock<HashMap<String, Query>>,
}

impl Store {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a store pre-seeded with the given query catalog. Queries have
	/// no write route; they are registered here, at startup.
	#[must_use]
	pub fn with_queries(queries: impl IntoIterator<Item = QueryParams>) -> Self {
		let queries = queries
			.into_iter()
			.map(|params| {
				let query = Query {
					id: new_id(),
					name: params.name,
					parameters: params.parameters,
					fields: params.fields,
					verb: params.verb,
				};

				(query.id.clone(), query)
			})
			.collect();

		Self {
			queries: RwLock::new(queries),
			..Self::default()
		}
	}

	pub fn extension(self) -> Extension {
		axum::Extension(Arc::new(self))
	}

	pub async fn create_application(&self, params: ApplicationParams) -> Application {
		let now = Utc::now();
		let application = Application {
			id: new_id(),
			name: params.name,
			url: params.url,
			created_at: now,
			updated_at: now,
		};

		tracing::debug!("Created application {}", application.id);
		self.applications
			.write()
			.await
			.insert(application.id.clone(), application.clone());

		application
	}

	pub async fn get_application(&self, id: &str) -> Result<Application, Error> {
		find(&self.applications, id, "application").await
	}

	pub async fn update_application(
		&self,
		id: &str,
		params: ApplicationParams,
	) -> Result<Application, Error> {
		let mut applications = self.applications.write().await;
		let application = applications
			.get_mut(id)
			.ok_or(Error::NotFound("application"))?;

		application.name = params.name;
		application.url = params.url;
		application.updated_at = Utc::now();

		Ok(application.clone())
	}

	pub async fn delete_application(&self, id: &str) -> Result<Application, Error> {
		self.applications
			.write()
			.await
			.remove(id)
			.ok_or(Error::NotFound("application"))
	}

	pub async fn search_applications(&self, name: &str) -> Vec<Application> {
		search(&self.applications, name, |application| &application.name).await
	}

	pub async fn create_table(&self, params: TableParams) -> Table {
		let table = Table {
			id: new_id(),
			name: params.name,
			schema: params.schema,
		};

		tracing::debug!("Created table {}", table.id);
		self.tables
			.write()
			.await
			.insert(table.id.clone(), table.clone());

		table
	}

	pub async fn get_table(&self, id: &str) -> Result<Table, Error> {
		find(&self.tables, id, "table").await
	}

	pub async fn update_table(&self, id: &str, params: TableParams) -> Result<Table, Error> {
		let mut tables = self.tables.write().await;
		let table = tables.get_mut(id).ok_or(Error::NotFound("table"))?;

		table.name = params.name;
		table.schema = params.schema;

		Ok(table.clone())
	}

	/// Delete a table along with every row stored in it.
	pub async fn delete_table(&self, id: &str) -> Result<Table, Error> {
		let table = self
			.tables
			.write()
			.await
			.remove(id)
			.ok_or(Error::NotFound("table"))?;

		self.rows.write().await.retain(|_, row| row.table_id != id);

		Ok(table)
	}

	pub async fn search_tables(&self, name: &str) -> Vec<Table> {
		search(&self.tables, name, |table| &table.name).await
	}

	pub async fn create_row(&self, table_id: &str, mut fields: RowParams) -> Result<Row, Error> {
		let table = self.get_table(table_id).await?;

		strip_reserved(&mut fields);
		validate_row(&table, &fields)?;

		let row = Row {
			id: new_id(),
			table_id: table.id,
			fields,
		};

		self.rows.write().await.insert(row.id.clone(), row.clone());

		Ok(row)
	}

	pub async fn get_row(&self, table_id: &str, row_id: &str) -> Result<Row, Error> {
		let row = find(&self.rows, row_id, "row").await?;
		if row.table_id != table_id {
			return Err(Error::NotFound("row"));
		}

		Ok(row)
	}

	pub async fn update_row(
		&self,
		table_id: &str,
		row_id: &str,
		mut fields: RowParams,
	) -> Result<Row, Error> {
		let table = self.get_table(table_id).await?;

		strip_reserved(&mut fields);
		validate_row(&table, &fields)?;

		let mut rows = self.rows.write().await;
		let row = rows
			.get_mut(row_id)
			.filter(|row| row.table_id == table_id)
			.ok_or(Error::NotFound("row"))?;

		row.fields = fields;

		Ok(row.clone())
	}

	pub async fn delete_row(&self, table_id: &str, row_id: &str) -> Result<Row, Error> {
		match self.rows.write().await.entry(row_id.to_string()) {
			Entry::Occupied(entry) if entry.get().table_id == table_id => Ok(entry.remove()),
			_ => Err(Error::NotFound("row")),
		}
	}

	/// Rows match when every field in the filter equals the row's value. An
	/// empty filter matches every row of the table.
	pub async fn search_rows(
		&self,
		table_id: &str,
		filter: &SearchRowsRequest,
	) -> Result<Vec<Row>, Error> {
		self.get_table(table_id).await?;

		let mut rows = self
			.rows
			.read()
			.await
			.values()
			.filter(|row| {
				row.table_id == table_id
					&& filter
						.query
						.iter()
						.all(|(name, value)| row.fields.get(name) == Some(value))
			})
			.cloned()
			.collect::<Vec<_>>();

		rows.sort_by(|a, b| a.id.cmp(&b.id));

		Ok(rows)
	}

	pub async fn create_user(&self, params: UserParams) -> User {
		let now = Utc::now();
		let user = User {
			id: new_id(),
			email: params.email,
			first_name: params.first_name,
			last_name: params.last_name,
			created_at: now,
			updated_at: now,
		};

		tracing::debug!("Created user {}", user.id);
		self.users.write().await.insert(user.id.clone(), user.clone());

		user
	}

	pub async fn get_user(&self, id: &str) -> Result<User, Error> {
		find(&self.users, id, "user").await
	}

	pub async fn update_user(&self, id: &str, params: UserParams) -> Result<User, Error> {
		let mut users = self.users.write().await;
		let user = users.get_mut(id).ok_or(Error::NotFound("user"))?;

		user.email = params.email;
		user.first_name = params.first_name;
		user.last_name = params.last_name;
		user.updated_at = Utc::now();

		Ok(user.clone())
	}

	pub async fn delete_user(&self, id: &str) -> Result<User, Error> {
		self.users
			.write()
			.await
			.remove(id)
			.ok_or(Error::NotFound("user"))
	}

	/// Users have no display name of their own, so the search prefix runs
	/// against the email address.
	pub async fn search_users(&self, name: &str) -> Vec<User> {
		search(&self.users, name, |user| &user.email).await
	}

	pub async fn get_query(&self, id: &str) -> Result<Query, Error> {
		find(&self.queries, id, "query").await
	}

	pub async fn search_queries(&self, name: &str) -> Vec<Query> {
		search(&self.queries, name, |query| &query.name).await
	}
}

fn new_id() -> String {
	Uuid::new_v4().to_string()
}

async fn find<T: Clone>(
	map: &RwLock<HashMap<String, T>>,
	id: &str,
	kind: &'static str,
) -> Result<T, Error> {
	map.read().await.get(id).cloned().ok_or(Error::NotFound(kind))
}

/// Case-insensitive prefix match on the resource's display name, sorted for
/// stable responses.
async fn search<T: Clone>(
	map: &RwLock<HashMap<String, T>>,
	name: &str,
	name_of: impl Fn(&T) -> &str,
) -> Vec<T> {
	let prefix = name.to_lowercase();

	let mut matches = map
		.read()
		.await
		.values()
		.filter(|item| name_of(item).to_lowercase().starts_with(&prefix))
		.cloned()
		.collect::<Vec<_>>();

	matches.sort_by(|a, b| name_of(a).cmp(name_of(b)));

	matches
}

/// The identifier fields are owned by the store; callers can't smuggle them
/// in through the dynamic column map.
fn strip_reserved(fields: &mut RowParams) {
	fields.remove("_id");
	fields.remove("tableId");
}

fn validate_row(table: &Table, fields: &RowParams) -> Result<(), ValidationErrorSet> {
	let mut errors = Vec::new();

	for (name, value) in fields {
		match table.schema.get(name) {
			None => errors.push(ValidationError::new(
				format!("'{name}' is not a column of table '{}'", table.name),
				vec![name.clone()],
			)),
			Some(column) if !accepts(column.kind, value) => errors.push(ValidationError::new(
				format!("expected a {:?} value", column.kind),
				vec![name.clone()],
			)),
			Some(_) => {},
		}
	}

	for (name, column) in &table.schema {
		if column.required && !fields.contains_key(name) {
			errors.push(ValidationError::new(
				format!("'{name}' is required"),
				vec![name.clone()],
			));
		}
	}

	if errors.is_empty() {
		Ok(())
	} else {
		Err(ValidationErrorSet::new(errors).fill_loc(&["body"]))
	}
}

fn accepts(kind: ColumnType, value: &Value) -> bool {
	if value.is_null() {
		return true;
	}

	match kind {
		ColumnType::String => value.is_string(),
		ColumnType::Number => value.is_number(),
		ColumnType::Boolean => value.is_boolean(),
		ColumnType::Json => true,
	}
}
