/// Statement part being rendered.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectWhere,
    SqlSelectOrderBy,
    SqlJoin,
    SqlInsertInto,
    SqlUpdateSet,
    SqlUpdateWhere,
    SqlDeleteFrom,
    SqlReadBack,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context<'a> {
    pub fragment: Fragment,
    /// Table prefixed to column names, when present.
    pub qualifier: Option<&'a str>,
}

impl<'a> Context<'a> {
    pub fn new(fragment: Fragment, qualifier: Option<&'a str>) -> Self {
        Self {
            fragment,
            qualifier,
        }
    }

    pub fn switch_fragment(&self, fragment: Fragment) -> Self {
        Self { fragment, ..*self }
    }

    pub fn qualified_by<'b>(&self, qualifier: Option<&'b str>) -> Context<'b> {
        Context {
            fragment: self.fragment,
            qualifier,
        }
    }
}
