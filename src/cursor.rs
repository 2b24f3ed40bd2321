use std::thread::panicking;

use crate::{
    Error, IntoBinder, IntoOptions,
    handles::Statement,
    target::{Indicator, IntoTarget},
};

/// Fetches the rows of a result set into application variables, one variable per column.
///
/// Columns are bound in the order [`Self::bind`] is called, starting with column `1`. Each call to
/// [`Self::fetch`] overwrites the variables with the values of the next row. Since the cursor
/// borrows the variables mutably for `'t`, they are inspected using [`Self::target`], or after the
/// cursor is gone.
///
/// Dropping the cursor unbinds all columns before the buffers are released.
pub struct IntoCursor<'t, S: Statement> {
    /// Only `None` after [`Self::into_statement`].
    statement: Option<S>,
    options: IntoOptions,
    next_position: u16,
    columns: Vec<BoundColumn<'t>>,
}

struct BoundColumn<'t> {
    binder: IntoBinder<'t>,
    indicator: Option<Indicator>,
}

impl<S: Statement> Drop for IntoCursor<'_, S> {
    fn drop(&mut self) {
        if let Some(statement) = self.statement.as_mut() {
            if let Err(e) = unbind_and_clean_up(statement, &mut self.columns) {
                // Avoid panicking, if we already have a panic. We don't want to mask the original
                // error.
                if !panicking() {
                    panic!("Unexpected error unbinding columns: {e:?}")
                }
            }
        }
    }
}

impl<'t, S: Statement> IntoCursor<'t, S> {
    /// `statement` must have been executed and have a result set. Rows must not have been fetched
    /// from it yet.
    pub fn new(statement: S, options: IntoOptions) -> Self {
        IntoCursor {
            statement: Some(statement),
            options,
            next_position: 1,
            columns: Vec::new(),
        }
    }

    /// Binds `target` to the next column. Fetching `NULL` into it is an error, use
    /// [`Self::bind_with_indicator`] for nullable columns.
    ///
    /// A failed bind still consumes the column position.
    pub fn bind(&mut self, target: impl Into<IntoTarget<'t>>) -> Result<(), Error> {
        self.bind_column(target.into(), None)
    }

    /// Binds `target` to the next column. [`Self::indicator`] tells whether the last fetched value
    /// has been `NULL`.
    pub fn bind_with_indicator(&mut self, target: impl Into<IntoTarget<'t>>) -> Result<(), Error> {
        self.bind_column(target.into(), Some(Indicator::Ok))
    }

    fn bind_column(
        &mut self,
        target: IntoTarget<'t>,
        indicator: Option<Indicator>,
    ) -> Result<(), Error> {
        let mut binder = IntoBinder::new(target, self.options);
        let Some(statement) = self.statement.as_mut() else {
            unreachable!("Statement is only taken by consuming the cursor.")
        };
        // Safety: The binder is owned by this cursor, which unbinds the columns before it drops
        // any binder.
        unsafe { binder.bind(statement, &mut self.next_position)? };
        self.columns.push(BoundColumn { binder, indicator });
        Ok(())
    }

    /// Fetches the next row into the bound variables. `false` if the result set is consumed, in
    /// which case the variables are left untouched.
    pub fn fetch(&mut self) -> Result<bool, Error> {
        for column in &mut self.columns {
            column.binder.pre_fetch();
        }
        let statement = self.statement_mut();
        let got_data = statement.fetch().into_result_bool(&*statement)?;
        for column in &mut self.columns {
            column
                .binder
                .post_fetch(got_data, true, column.indicator.as_mut())?;
        }
        Ok(got_data)
    }

    /// Whether the value fetched into the column at `index` (zero based) has been `NULL`. `None`
    /// if the column has been bound without indicator.
    ///
    /// # Panics
    ///
    /// If `index` is not smaller than [`Self::num_cols`].
    pub fn indicator(&self, index: usize) -> Option<Indicator> {
        self.columns[index].indicator
    }

    /// Variable bound to the column at `index` (zero based).
    ///
    /// # Panics
    ///
    /// If `index` is not smaller than [`Self::num_cols`].
    pub fn target(&self, index: usize) -> &IntoTarget<'t> {
        self.columns[index].binder.target()
    }

    /// Binder of the column at `index` (zero based).
    pub fn binder(&self, index: usize) -> &IntoBinder<'t> {
        &self.columns[index].binder
    }

    /// Number of bound columns.
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// Unbinds all columns, releases the buffers and returns the statement.
    pub fn into_statement(mut self) -> Result<S, Error> {
        let Some(mut statement) = self.statement.take() else {
            unreachable!("Statement is only taken by consuming the cursor.")
        };
        unbind_and_clean_up(&mut statement, &mut self.columns)?;
        Ok(statement)
    }

    fn statement_mut(&mut self) -> &mut S {
        match self.statement.as_mut() {
            Some(statement) => statement,
            None => unreachable!("Statement is only taken by consuming the cursor."),
        }
    }
}

fn unbind_and_clean_up(
    statement: &mut impl Statement,
    columns: &mut [BoundColumn<'_>],
) -> Result<(), Error> {
    if columns.is_empty() {
        return Ok(());
    }
    statement.unbind_cols().into_result(&*statement)?;
    for column in columns {
        column.binder.clean_up();
    }
    Ok(())
}
