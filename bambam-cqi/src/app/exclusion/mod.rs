mod exclusion_list;

pub use exclusion_list::ExclusionList;
