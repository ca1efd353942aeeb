mod semantic_tests;
