//! HR table schema: DDL text for the translator and column descriptions for the shell.

use crate::domain::{Column, Table, Value};

/// One column of the HR table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: String,
    pub sql_type: String,
    pub description: String,
}

/// Table name plus ordered column definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<SchemaColumn>,
}

const HR_COLUMNS: &[(&str, &str, &str)] = &[
    ("EMPLOYEE_NAME", "VARCHAR2(100)", "Full name of the employee."),
    ("EMPID", "NUMBER", "Unique identifier assigned to each employee."),
    ("SALARY", "NUMBER", "Current or last drawn salary of the employee."),
    ("POSITION", "VARCHAR2(100)", "Job title/role of the employee (e.g., Technician, Engineer)."),
    ("STATE", "VARCHAR2(50)", "Work location (state) of the employee."),
    ("DOB", "DATE", "Date of birth of the employee."),
    ("SEX", "VARCHAR2(10)", "Gender of the employee (M/F)."),
    ("MARITALDESC", "VARCHAR2(50)", "Marital status (Single, Married, Divorced, Widowed)."),
    ("CITIZENDESC", "VARCHAR2(50)", "Citizenship status (e.g., US Citizen)."),
    ("HISPANICLATINO", "VARCHAR2(10)", "Whether employee is Hispanic/Latino (Yes/No)."),
    ("RACEDESC", "VARCHAR2(50)", "Racial/ethnic background of the employee."),
    ("DATEOFHIRE", "DATE", "Date when the employee joined the company."),
    ("DATEOFTERMINATION", "DATE", "Last working date (blank if still employed)."),
    ("ON_NOTICEPERIOD", "VARCHAR2(10)", "Whether employee is currently serving notice (YES/NO)."),
    ("TERMREASON", "VARCHAR2(200)", "Reason for termination/exit (e.g., career change, unhappy)."),
    ("DEPARTMENT", "VARCHAR2(100)", "Department the employee belongs to (e.g., IT, Production)."),
    ("MANAGERNAME", "VARCHAR2(100)", "Name of the reporting manager."),
    ("MANAGERID", "NUMBER", "Unique ID of the reporting manager."),
    ("RECRUITMENTSOURCE", "VARCHAR2(100)", "Source through which employee was recruited (LinkedIn, Indeed, Referral)."),
    ("DAYSLATELAST30", "NUMBER", "Number of days employee was late in the last 30 days."),
    ("ABSENCES", "NUMBER", "Total number of absences recorded."),
    ("EMPLOYEE_EMAIL", "VARCHAR2(200)", "Employee's email address."),
    ("MANAGER_EMAIL", "VARCHAR2(200)", "Manager's email address."),
];

impl TableSchema {
    /// The HR dataset schema under the given table name.
    pub fn hr_dataset(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: HR_COLUMNS
                .iter()
                .map(|(name, sql_type, description)| SchemaColumn {
                    name: name.to_string(),
                    sql_type: sql_type.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }

    /// `TABLE(\n    COL TYPE,\n ...)` text handed to the query translator.
    pub fn ddl_text(&self) -> String {
        let width = self.columns.iter().map(|c| c.name.len()).max().unwrap_or(0) + 6;
        let body: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {:<width$} {}", c.name, c.sql_type, width = width))
            .collect();
        format!("{}(\n{}\n)", self.table_name, body.join(",\n"))
    }

    /// `COL : DESCRIPTION` lines appended to the translator prompt.
    pub fn column_notes(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{} : {}", c.name, c.description.to_uppercase()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Two-column (column_name, description) table shown in the shell.
    pub fn description_table(&self) -> Table {
        Table::new(vec![
            Column::new(
                "column_name",
                self.columns
                    .iter()
                    .map(|c| Value::Text(c.name.clone()))
                    .collect(),
            ),
            Column::new(
                "description",
                self.columns
                    .iter()
                    .map(|c| Value::Text(c.description.clone()))
                    .collect(),
            ),
        ])
    }

    /// Columns offered for indirect lookup: names containing "EMAIL".
    pub fn email_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.name.to_uppercase().contains("EMAIL"))
            .map(|c| c.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ddl_text_lists_columns() {
        let schema = TableSchema::hr_dataset("HR_DATASET");
        let ddl = schema.ddl_text();
        assert!(ddl.starts_with("HR_DATASET(\n"));
        assert!(ddl.contains("SALARY"));
        assert!(ddl.trim_end().ends_with(')'));
        assert_eq!(ddl.matches(",\n").count(), schema.columns.len() - 1);
    }

    #[test]
    fn test_email_columns() {
        let schema = TableSchema::hr_dataset("HR_DATASET");
        assert_eq!(
            schema.email_columns(),
            vec!["EMPLOYEE_EMAIL".to_string(), "MANAGER_EMAIL".to_string()]
        );
    }

    #[test]
    fn test_description_table_shape() {
        let t = TableSchema::hr_dataset("HR").description_table();
        assert_eq!(t.column_count(), 2);
        assert_eq!(t.row_count(), HR_COLUMNS.len());
    }
}
