mod ht002_test;
mod ht006_test;
mod inline_config_test;
mod rule_selection_test;
