mod context_laws;
